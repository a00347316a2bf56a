use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::{Item, Rgb};

/// Values must fit the side-channel packet's one-byte length prefix.
pub const MAX_VALUE_BYTES: usize = u8::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideError {
    #[error("unknown item parameter '{0}' (expected damage, knockback, crit, mana, color, speed, projectile, useatime)")]
    UnknownParameter(String),

    #[error("parameter value must not be empty")]
    EmptyValue,

    #[error("parameter '{param}' must be a number, got '{value}'")]
    NotANumber { param: OverrideParam, value: String },

    #[error("parameter '{param}' must be an integer, got '{value}'")]
    NotAnInteger { param: OverrideParam, value: String },

    #[error("color must be six hex digits (RRGGBB), got '{0}'")]
    BadColor(String),

    #[error("parameter value is longer than {MAX_VALUE_BYTES} bytes")]
    ValueTooLong,
}

/// The fixed vocabulary of overridable item attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideParam {
    Damage,
    Knockback,
    Crit,
    ManaCost,
    Color,
    ProjectileSpeed,
    ProjectileId,
    UseTimeScale,
}

impl OverrideParam {
    /// Case-insensitive lookup. `useatime` and `attacktime` name the same effect.
    pub fn parse(name: &str) -> Result<Self, OverrideError> {
        match name.trim().to_lowercase().as_str() {
            "damage" => Ok(Self::Damage),
            "knockback" => Ok(Self::Knockback),
            "crit" => Ok(Self::Crit),
            "mana" => Ok(Self::ManaCost),
            "color" => Ok(Self::Color),
            "speed" => Ok(Self::ProjectileSpeed),
            "projectile" => Ok(Self::ProjectileId),
            "useatime" | "attacktime" => Ok(Self::UseTimeScale),
            _ => Err(OverrideError::UnknownParameter(name.to_string())),
        }
    }

    /// Name used in storage and in the side-channel packet.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::Knockback => "knockback",
            Self::Crit => "crit",
            Self::ManaCost => "mana",
            Self::Color => "color",
            Self::ProjectileSpeed => "speed",
            Self::ProjectileId => "projectile",
            Self::UseTimeScale => "useatime",
        }
    }
}

impl fmt::Display for OverrideParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A validated transform. Parsing happens once, when the override is defined,
/// so applying one cannot fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideKind {
    Damage(f32),
    Knockback(f32),
    Crit(f32),
    ManaCost(f32),
    Color(Rgb),
    ProjectileSpeed(f32),
    ProjectileId(i32),
    UseTimeScale(f32),
}

impl OverrideKind {
    pub fn parse(param: OverrideParam, value: &str) -> Result<Self, OverrideError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(OverrideError::EmptyValue);
        }
        let number = || -> Result<f32, OverrideError> {
            value
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| OverrideError::NotANumber {
                    param,
                    value: value.to_string(),
                })
        };
        Ok(match param {
            OverrideParam::Damage => Self::Damage(number()?),
            OverrideParam::Knockback => Self::Knockback(number()?),
            OverrideParam::Crit => Self::Crit(number()?),
            OverrideParam::ManaCost => Self::ManaCost(number()?),
            OverrideParam::ProjectileSpeed => Self::ProjectileSpeed(number()?),
            OverrideParam::UseTimeScale => Self::UseTimeScale(number()?),
            OverrideParam::ProjectileId => {
                Self::ProjectileId(value.parse::<i32>().map_err(|_| OverrideError::NotAnInteger {
                    param,
                    value: value.to_string(),
                })?)
            }
            OverrideParam::Color => Self::Color(parse_hex_color(value)?),
        })
    }

    pub fn param(&self) -> OverrideParam {
        match self {
            Self::Damage(_) => OverrideParam::Damage,
            Self::Knockback(_) => OverrideParam::Knockback,
            Self::Crit(_) => OverrideParam::Crit,
            Self::ManaCost(_) => OverrideParam::ManaCost,
            Self::Color(_) => OverrideParam::Color,
            Self::ProjectileSpeed(_) => OverrideParam::ProjectileSpeed,
            Self::ProjectileId(_) => OverrideParam::ProjectileId,
            Self::UseTimeScale(_) => OverrideParam::UseTimeScale,
        }
    }
}

fn parse_hex_color(value: &str) -> Result<Rgb, OverrideError> {
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(OverrideError::BadColor(value.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&value[i..i + 2], 16)
            .map_err(|_| OverrideError::BadColor(value.to_string()))
    };
    Ok(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// A per-space attribute override for one item id. `value` keeps the text the
/// override was defined with; it is what clients receive on the side channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOverride {
    pub item_id: i32,
    pub kind: OverrideKind,
    pub value: String,
}

impl ItemOverride {
    pub fn new(item_id: i32, param: &str, value: &str) -> Result<Self, OverrideError> {
        let param = OverrideParam::parse(param)?;
        let value = value.trim();
        if value.len() > MAX_VALUE_BYTES {
            return Err(OverrideError::ValueTooLong);
        }
        let kind = OverrideKind::parse(param, value)?;
        Ok(Self {
            item_id,
            kind,
            value: value.to_string(),
        })
    }

    pub fn param(&self) -> OverrideParam {
        self.kind.param()
    }
}

/// Apply one validated transform to a live item in place.
pub fn apply_override(item: &mut Item, kind: &OverrideKind) {
    let stats = &mut item.stats;
    match *kind {
        OverrideKind::Damage(mult) => {
            stats.damage = (stats.damage as f32 * mult).floor() as i32;
        }
        OverrideKind::Knockback(mult) => {
            stats.knockback *= mult;
        }
        OverrideKind::Crit(delta) => {
            stats.crit = (stats.crit as f32 + delta) as i32;
        }
        OverrideKind::ManaCost(mult) => {
            stats.mana = (stats.mana as f32 * mult).floor() as i32;
        }
        OverrideKind::Color(rgb) => {
            stats.color = Some(rgb);
        }
        OverrideKind::ProjectileSpeed(mult) => {
            stats.shoot_speed *= mult;
        }
        OverrideKind::ProjectileId(id) => {
            stats.shoot = id;
        }
        OverrideKind::UseTimeScale(mult) => {
            stats.use_time = (stats.use_time as f32 * mult).floor() as i32;
            stats.use_animation = (stats.use_animation as f32 * mult).floor() as i32;
        }
    }
}
