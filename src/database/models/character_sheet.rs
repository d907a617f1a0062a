use serde::{Deserialize, Deserializer, Serialize};

use crate::types::ObjectId;

/// Decode `null` as the field's zero value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` and `""` both decode to the zero id.
fn nullable_id<'de, D>(deserializer: D) -> Result<ObjectId, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(ObjectId::default()),
        Some(s) if s.is_empty() => Ok(ObjectId::default()),
        Some(s) => ObjectId::parse_hex(&s).map_err(serde::de::Error::custom),
    }
}

/// FFG Star Wars character sheet for Force-sensitive characters.
///
/// Every field defaults when absent or `null` in the payload, so a partially
/// filled sheet decodes cleanly; `version == 0` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceCharacterSheet {
    #[serde(rename = "_id", deserialize_with = "nullable_id")]
    pub id: ObjectId,
    #[serde(deserialize_with = "nullable")]
    pub character_name: String,
    #[serde(deserialize_with = "nullable")]
    pub player_name: String,
    #[serde(deserialize_with = "nullable")]
    pub species: String,
    #[serde(deserialize_with = "nullable")]
    pub career: String,
    #[serde(deserialize_with = "nullable")]
    pub specialization_trees: Vec<SpecializationTree>,
    #[serde(deserialize_with = "nullable")]
    pub soak_value: i64,
    #[serde(rename = "wound", deserialize_with = "nullable")]
    pub wounds: Amount,
    #[serde(deserialize_with = "nullable")]
    pub strain: Amount,
    #[serde(deserialize_with = "nullable")]
    pub defense: DefenseStats,
    #[serde(deserialize_with = "nullable")]
    pub characteristics: Characteristics,
    #[serde(deserialize_with = "nullable")]
    pub skills: Vec<Skill>,
    #[serde(deserialize_with = "nullable")]
    pub weapons: Vec<Weapon>,
    #[serde(rename = "totalXP", deserialize_with = "nullable")]
    pub total_xp: i64,
    #[serde(rename = "availableXP", deserialize_with = "nullable")]
    pub available_xp: i64,
    #[serde(deserialize_with = "nullable")]
    pub motivation: Motivation,
    #[serde(deserialize_with = "nullable")]
    pub morality: Morality,
    #[serde(alias = "charcaterDescription", deserialize_with = "nullable")]
    pub character_description: CharacterDescription,
    #[serde(deserialize_with = "nullable")]
    pub equipment: Equipment,
    #[serde(deserialize_with = "nullable")]
    pub critical_injuries: Vec<CriticalInjury>,
    #[serde(deserialize_with = "nullable")]
    pub talents: Vec<Talent>,
    #[serde(deserialize_with = "nullable")]
    pub force_rating: i64,
    #[serde(deserialize_with = "nullable")]
    pub version: i64,
}

/// Threshold vs current value (wounds, strain).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Amount {
    #[serde(deserialize_with = "nullable")]
    pub threshold: i64,
    #[serde(deserialize_with = "nullable")]
    pub current: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseStats {
    #[serde(deserialize_with = "nullable")]
    pub ranged: i64,
    #[serde(deserialize_with = "nullable")]
    pub melee: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecializationTree {
    #[serde(deserialize_with = "nullable")]
    pub tree_name: String,
    #[serde(deserialize_with = "nullable")]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Characteristics {
    #[serde(deserialize_with = "nullable")]
    pub brawn: i64,
    #[serde(deserialize_with = "nullable")]
    pub agility: i64,
    #[serde(deserialize_with = "nullable")]
    pub intellect: i64,
    #[serde(deserialize_with = "nullable")]
    pub cunning: i64,
    #[serde(deserialize_with = "nullable")]
    pub willpower: i64,
    #[serde(deserialize_with = "nullable")]
    pub presence: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub characteristic: String,
    #[serde(deserialize_with = "nullable")]
    pub career: bool,
    #[serde(deserialize_with = "nullable")]
    pub level: i64,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub skill: String,
    #[serde(deserialize_with = "nullable")]
    pub damage: String,
    #[serde(deserialize_with = "nullable")]
    pub crit: i64,
    #[serde(deserialize_with = "nullable")]
    pub range: String,
    #[serde(deserialize_with = "nullable")]
    pub special: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Motivation {
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Morality {
    #[serde(deserialize_with = "nullable")]
    pub emotional_strength: String,
    #[serde(deserialize_with = "nullable")]
    pub emotional_weakness: String,
    #[serde(deserialize_with = "nullable")]
    pub conflict: i64,
    #[serde(deserialize_with = "nullable")]
    pub morality: i64,
}

/// Physical appearance of a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterDescription {
    #[serde(deserialize_with = "nullable")]
    pub gender: String,
    #[serde(deserialize_with = "nullable")]
    pub age: i64,
    #[serde(deserialize_with = "nullable")]
    pub height: i64,
    #[serde(deserialize_with = "nullable")]
    pub build: String,
    #[serde(deserialize_with = "nullable")]
    pub hair: String,
    #[serde(deserialize_with = "nullable")]
    pub eyes: String,
    #[serde(deserialize_with = "nullable")]
    pub notable_features: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Equipment {
    #[serde(deserialize_with = "nullable")]
    pub credits: i64,
    #[serde(deserialize_with = "nullable")]
    pub armor: Vec<Gear>,
    #[serde(deserialize_with = "nullable")]
    pub personal_gear: Vec<Gear>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gear {
    #[serde(deserialize_with = "nullable")]
    pub gear: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalInjury {
    #[serde(deserialize_with = "nullable")]
    pub severity: i64,
    #[serde(deserialize_with = "nullable")]
    pub result: bool,
}

/// Talent acquired through a specialization tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Talent {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub page: i64,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub force_power: Vec<ForcePower>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcePower {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub completed: bool,
}
