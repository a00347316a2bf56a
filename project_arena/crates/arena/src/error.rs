use inventory::{OverrideError, OverrideParam};
use session::PlayerId;
use space::SpaceError;

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Override(#[from] OverrideError),

    #[error("space '{0}' not found")]
    SpaceNotFound(String),

    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    #[error("space '{space}' has no '{param}' override for item {item_id}")]
    OverrideNotFound {
        space: String,
        item_id: i32,
        param: OverrideParam,
    },

    #[error("player is not in a space")]
    NotInSpace,

    #[error("player {0} is not online")]
    PlayerOffline(PlayerId),

    #[error("space '{space}' is full ({capacity} players)")]
    SpaceFull { space: String, capacity: u32 },

    #[error("space '{0}' already exists")]
    SpaceExists(String),

    #[error("template '{0}' already exists")]
    TemplateExists(String),

    #[error("reward area '{0}' already exists")]
    RewardAreaExists(String),

    #[error("template '{template}' is already offered by space '{space}'")]
    TemplateAlreadyOffered { space: String, template: String },

    #[error("template '{template}' is not offered by space '{space}'")]
    TemplateNotOffered { space: String, template: String },
}

impl From<SpaceError> for ArenaError {
    fn from(e: SpaceError) -> Self {
        match e {
            SpaceError::AlreadyExists(name) => Self::SpaceExists(name),
            SpaceError::NotFound(name) => Self::SpaceNotFound(name),
            SpaceError::TemplateAlreadyOffered { space, template } => {
                Self::TemplateAlreadyOffered { space, template }
            }
            SpaceError::TemplateNotOffered { space, template } => {
                Self::TemplateNotOffered { space, template }
            }
            SpaceError::OverrideNotFound {
                space,
                item_id,
                param,
            } => Self::OverrideNotFound {
                space,
                item_id,
                param,
            },
        }
    }
}
