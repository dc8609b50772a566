/// An inclusive or exclusive decimal bound, kept as written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalBound {
    pub value: String,
    pub inclusive: bool,
}

impl DecimalBound {
    pub fn inclusive(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            inclusive: true,
        }
    }

    pub fn exclusive(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
        }
    }
}

/// Length bounds for strings and item-count bounds for arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

/// `minProperties`/`maxProperties` on objects and maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyCount {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

/// Validation constraints attached to a type, independent of necessity and
/// nullability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub decimal_min: Option<DecimalBound>,
    pub decimal_max: Option<DecimalBound>,
    pub multiple_of: Option<String>,
    pub size: Option<Size>,
    pub pattern: Option<String>,
    pub email: bool,
    pub property_count: Option<PropertyCount>,
}

impl Constraints {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn of_min(min: i64) -> Self {
        Self::empty().with_min(min)
    }

    pub fn of_max(max: i64) -> Self {
        Self::empty().with_max(max)
    }

    pub fn of_email() -> Self {
        Self {
            email: true,
            ..Self::default()
        }
    }

    pub fn of_size(min: Option<u64>, max: Option<u64>) -> Self {
        Self::empty().with_size(min, max)
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_decimal_min(mut self, bound: DecimalBound) -> Self {
        self.decimal_min = Some(bound);
        self
    }

    pub fn with_decimal_max(mut self, bound: DecimalBound) -> Self {
        self.decimal_max = Some(bound);
        self
    }

    pub fn with_multiple_of(mut self, value: impl Into<String>) -> Self {
        self.multiple_of = Some(value.into());
        self
    }

    /// Sets size bounds; a call with both ends absent leaves size unset.
    pub fn with_size(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        if min.is_some() || max.is_some() {
            self.size = Some(Size { min, max });
        }
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_email(mut self) -> Self {
        self.email = true;
        self
    }

    pub fn with_property_count(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        if min.is_some() || max.is_some() {
            self.property_count = Some(PropertyCount { min, max });
        }
        self
    }

    /// Short human-readable labels, e.g. `min=1`, `pattern=^a`.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some(min) = self.min {
            labels.push(format!("min={min}"));
        }
        if let Some(max) = self.max {
            labels.push(format!("max={max}"));
        }
        if let Some(ref b) = self.decimal_min {
            let op = if b.inclusive { ">=" } else { ">" };
            labels.push(format!("decimal{op}{}", b.value));
        }
        if let Some(ref b) = self.decimal_max {
            let op = if b.inclusive { "<=" } else { "<" };
            labels.push(format!("decimal{op}{}", b.value));
        }
        if let Some(ref m) = self.multiple_of {
            labels.push(format!("multipleOf={m}"));
        }
        if let Some(size) = self.size {
            labels.push(format!("size={}", range(size.min, size.max)));
        }
        if let Some(ref p) = self.pattern {
            labels.push(format!("pattern={p}"));
        }
        if self.email {
            labels.push("email".to_string());
        }
        if let Some(count) = self.property_count {
            labels.push(format!("properties={}", range(count.min, count.max)));
        }
        labels
    }
}

fn range(min: Option<u64>, max: Option<u64>) -> String {
    let fmt = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_default();
    format!("{}..{}", fmt(min), fmt(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(Constraints::empty().is_empty());
        assert!(Constraints::empty().with_size(None, None).is_empty());
        assert!(!Constraints::of_email().is_empty());
    }

    #[test]
    fn test_labels() {
        let c = Constraints::of_min(18)
            .with_max(50)
            .with_size(Some(1), None)
            .with_decimal_max(DecimalBound::exclusive("9.5"));
        assert_eq!(c.labels(), vec!["min=18", "max=50", "decimal<9.5", "size=1.."]);
    }
}
