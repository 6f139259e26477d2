use crate::error::TransducerError;
use crate::record::ParagraphClass;

/// The `type` of a `<seg>` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    SofPasuq,
    Maqqef,
    Paseq,
    Pe,
    Samekh,
    Large,
    ReversedNun,
    Suspended,
    Small,
}

/// Whether trailing text attaches to the current token, and whether a space
/// follows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePolicy {
    pub add_to_current: bool,
    pub add_space: bool,
}

impl MergePolicy {
    pub const NONE: MergePolicy = MergePolicy {
        add_to_current: false,
        add_space: false,
    };
}

impl SegmentType {
    pub fn parse(value: &str) -> Result<Self, TransducerError> {
        let segment = match value {
            "x-sof-pasuq" => SegmentType::SofPasuq,
            "x-maqqef" => SegmentType::Maqqef,
            "x-paseq" => SegmentType::Paseq,
            "x-pe" => SegmentType::Pe,
            "x-samekh" => SegmentType::Samekh,
            "x-large" => SegmentType::Large,
            "x-reversednun" => SegmentType::ReversedNun,
            "x-suspended" => SegmentType::Suspended,
            "x-small" => SegmentType::Small,
            other => {
                return Err(TransducerError::UnknownSegmentType {
                    value: other.to_string(),
                })
            }
        };
        Ok(segment)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentType::SofPasuq => "x-sof-pasuq",
            SegmentType::Maqqef => "x-maqqef",
            SegmentType::Paseq => "x-paseq",
            SegmentType::Pe => "x-pe",
            SegmentType::Samekh => "x-samekh",
            SegmentType::Large => "x-large",
            SegmentType::ReversedNun => "x-reversednun",
            SegmentType::Suspended => "x-suspended",
            SegmentType::Small => "x-small",
        }
    }

    /// Policy in force while the segment's own text is read.
    pub fn open_policy(self) -> MergePolicy {
        match self {
            SegmentType::Maqqef => MergePolicy {
                add_to_current: true,
                add_space: false,
            },
            SegmentType::SofPasuq => MergePolicy {
                add_to_current: true,
                add_space: true,
            },
            _ => MergePolicy::NONE,
        }
    }

    /// Policy left behind once the segment closes. A maqqef keeps joining the
    /// next word to the current token.
    pub fn close_policy(self) -> MergePolicy {
        match self {
            SegmentType::Maqqef => MergePolicy {
                add_to_current: true,
                add_space: false,
            },
            _ => MergePolicy::NONE,
        }
    }

    /// The paragraph class sealed by this marker, if it ends a paragraph.
    pub fn paragraph_class(self) -> Option<ParagraphClass> {
        match self {
            SegmentType::Pe => Some(ParagraphClass::Pe),
            SegmentType::Samekh => Some(ParagraphClass::Samekh),
            _ => None,
        }
    }
}
