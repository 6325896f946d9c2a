use serde::{Deserialize, Serialize};

/// Closed set of stored codes, each with an English label.
pub trait Coded: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn code(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.code() == code)
    }

    fn translated(self) -> Translated {
        Translated::new(self.code(), self.label())
    }
}

/// Declares a coded enum: stored as its code, rendered as `{value, en}`.
macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::workflows::steps::values::Coded for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::workflows::steps::values::Coded::code(*self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::workflows::steps::values::Coded>::from_code(&raw).ok_or_else(|| {
                    ::serde::de::Error::custom(format!(
                        "unknown {} code '{}'",
                        stringify!($name),
                        raw
                    ))
                })
            }
        }
    };
}

pub(crate) use code_table;

code_table! {
    pub enum YesNo {
        Yes => ("yes", "Yes"),
        No => ("no", "No"),
    }
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }
}

/// Outbound rendering of a coded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translated {
    pub value: String,
    pub en: String,
}

impl Translated {
    pub fn new(value: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            en: en.into(),
        }
    }
}

/// Inbound coded value that may arrive bare or already translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodedField {
    Plain(String),
    Labelled {
        value: String,
        #[serde(default)]
        en: Option<String>,
    },
}

impl CodedField {
    pub fn code(&self) -> &str {
        match self {
            CodedField::Plain(code) => code,
            CodedField::Labelled { value, .. } => value,
        }
    }

    pub fn parse<T: Coded>(&self) -> Option<T> {
        T::from_code(self.code())
    }
}
