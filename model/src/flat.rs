use serde_repr::{Deserialize_repr, Serialize_repr};

/// Flat type as an ordered category, serialized as its ordinal code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum FlatType {
    OneRoom = 0,
    TwoRoom,
    ThreeRoom,
    FourRoom,
    FiveRoom,
    Executive,
    MultiGeneration,
}

impl FlatType {
    pub fn parse(raw: &str) -> Option<FlatType> {
        Some(match raw {
            "1 ROOM" => Self::OneRoom,
            "2 ROOM" => Self::TwoRoom,
            "3 ROOM" => Self::ThreeRoom,
            "4 ROOM" => Self::FourRoom,
            "5 ROOM" => Self::FiveRoom,
            "EXECUTIVE" => Self::Executive,
            "MULTI-GENERATION" => Self::MultiGeneration,
            _ => return None,
        })
    }
}
