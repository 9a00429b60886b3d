use std::fmt;

use serde::{Deserialize, Serialize};

// Handles are opaque names resolved by the `Stage` implementation.
macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a handle from a name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// The name this handle refers to.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }
    };
}

handle!(
    /// A text surface (dialogue box body, terminal message line).
    SurfaceId
);
handle!(
    /// An animator controlling a character's dialogue box.
    AnimatorId
);
handle!(
    /// An audio channel that plays one clip at a time.
    ChannelId
);
handle!(
    /// An audio clip (voice line, ring tone, sound effect).
    ClipId
);
handle!(
    /// A door that can be powered.
    DoorId
);
handle!(
    /// A particle or visual effect that can be switched on and off.
    EffectId
);
handle!(
    /// A sprite whose tint can change.
    SpriteId
);

/// A one-shot sound: which clip to play on which channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cue {
    /// The channel the clip plays on.
    pub channel: ChannelId,
    /// The clip to play.
    pub clip: ClipId,
}

impl Cue {
    /// Create a cue from a channel and clip name.
    pub fn new(channel: impl Into<String>, clip: impl Into<String>) -> Self {
        Self {
            channel: ChannelId::new(channel),
            clip: ClipId::new(clip),
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.clip, self.channel)
    }
}
