use serde::{Deserialize, Deserializer, Serialize};

/// Represents optional field semantics in PATCH/UPDATE requests.
///
/// - `Unchanged` → field absent from the body
/// - `SetToNull` → explicitly `null`
/// - `SetToValue` → set to provided value
///
/// Fields must be marked `#[serde(default)]` so that an absent key stays
/// `Unchanged`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

impl<T> OptionField<T> {
    /// Convert to nested option:
    /// - `None` → unchanged
    /// - `Some(None)` → set null
    /// - `Some(Some(T))` → set to value
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Self::Unchanged => None,
            Self::SetToNull => Some(None),
            Self::SetToValue(v) => Some(Some(v)),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// If `SetToValue`, returns a reference to inner value.
    pub fn value_ref(&self) -> Option<&T> {
        if let Self::SetToValue(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Applies the patch to a nullable target.
    pub fn apply_to(self, target: &mut Option<T>) {
        if let Some(value) = self.into_option() {
            *target = value;
        }
    }

    /// Applies the patch to a non-nullable target; `SetToNull` is ignored.
    pub fn apply_required(self, target: &mut T) {
        if let Self::SetToValue(value) = self {
            *target = value;
        }
    }
}

impl<T> From<Option<Option<T>>> for OptionField<T> {
    fn from(opt: Option<Option<T>>) -> Self {
        match opt {
            None => OptionField::Unchanged,
            Some(None) => OptionField::SetToNull,
            Some(Some(v)) => OptionField::SetToValue(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default)]
        link: OptionField<String>,
    }

    #[test]
    fn absent_null_and_value_are_distinguished() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"link": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"link": "https://x.dev"}"#).unwrap();

        assert!(absent.link.is_unchanged());
        assert_eq!(null.link, OptionField::SetToNull);
        assert_eq!(value.link.value_ref().map(String::as_str), Some("https://x.dev"));
    }

    #[test]
    fn apply_to_respects_each_state() {
        let mut target = Some("old".to_string());
        OptionField::Unchanged.apply_to(&mut target);
        assert_eq!(target.as_deref(), Some("old"));

        OptionField::SetToValue("new".to_string()).apply_to(&mut target);
        assert_eq!(target.as_deref(), Some("new"));

        OptionField::SetToNull.apply_to(&mut target);
        assert_eq!(target, None);
    }

    #[test]
    fn serializes_each_state() {
        assert_eq!(serde_json::to_value(OptionField::<String>::Unchanged).unwrap(), "Unchanged");
        assert_eq!(serde_json::to_value(OptionField::<String>::SetToNull).unwrap(), "SetToNull");
        assert_eq!(
            serde_json::to_value(OptionField::SetToValue("x".to_string())).unwrap(),
            serde_json::json!({ "SetToValue": "x" })
        );
    }
}
