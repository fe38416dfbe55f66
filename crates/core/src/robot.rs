//! Shared vocabulary for conversation modes and robot actions.
//!
//! Every action enum parses from, and displays as, the lowercase path segment
//! used on the wire by both the gateway and the robot-control service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a string is not part of an action or mode allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct ParseActionError {
    pub kind: &'static str,
    pub value: String,
}

/// Which conversational agent a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Talk,
    #[default]
    Guess,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Talk => "talk",
            Mode::Guess => "guess",
        }
    }

    /// Client tools the agent may call in this mode. Only the guessing game
    /// drives the robot.
    pub fn client_tools(&self) -> &'static [ClientTool] {
        match self {
            Mode::Talk => &[],
            Mode::Guess => &[ClientTool::RobotYes, ClientTool::RobotNo],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "talk" => Ok(Mode::Talk),
            "guess" => Ok(Mode::Guess),
            other => Err(ParseActionError {
                kind: "mode",
                value: other.to_string(),
            }),
        }
    }
}

// Declares a lowercase action enum with its wire segments.
macro_rules! action_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $segment:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $segment),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseActionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($segment => Ok($name::$variant),)+
                    other => Err(ParseActionError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

action_enum!(
    /// Head gestures the robot acts out with its drive motors.
    Gesture, "gesture", { Yes => "yes", No => "no" }
);

action_enum!(
    /// States of the robot's LED strip.
    LedAction, "led action", { On => "on", Off => "off", Blink => "blink" }
);

action_enum!(
    /// Camera servo positions.
    MovementAction, "movement action", {
        Scan => "scan",
        Left => "left",
        Right => "right",
        Center => "center",
    }
);

/// Capabilities the conversational agent can invoke on the client mid-conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientTool {
    RobotYes,
    RobotNo,
}

impl ClientTool {
    /// The tool name as registered with the voice agent.
    pub fn name(&self) -> &'static str {
        match self {
            ClientTool::RobotYes => "robotYes",
            ClientTool::RobotNo => "robotNo",
        }
    }

    pub fn gesture(&self) -> Gesture {
        match self {
            ClientTool::RobotYes => Gesture::Yes,
            ClientTool::RobotNo => Gesture::No,
        }
    }
}

impl FromStr for ClientTool {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "robotYes" => Ok(ClientTool::RobotYes),
            "robotNo" => Ok(ClientTool::RobotNo),
            other => Err(ParseActionError {
                kind: "client tool",
                value: other.to_string(),
            }),
        }
    }
}
