use serde::{Deserialize, Serialize};

/// Identity of an escalation rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    Fast,
    Robust,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostClass {
    Low,
    High,
}

/// An upstream model configuration. Exactly two exist: `fast` (always tried first)
/// and `robust` (only after the fast tier failed or came back incomplete).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTier {
    pub kind: TierKind,
    pub model: String,
    pub cost_class: CostClass,
    /// Fast mode turns the extended reasoning budget off.
    pub supports_fast_mode: bool,
}

impl ModelTier {
    pub fn fast(model: impl Into<String>) -> Self {
        Self {
            kind: TierKind::Fast,
            model: model.into(),
            cost_class: CostClass::Low,
            supports_fast_mode: true,
        }
    }

    pub fn robust(model: impl Into<String>) -> Self {
        Self {
            kind: TierKind::Robust,
            model: model.into(),
            cost_class: CostClass::High,
            supports_fast_mode: false,
        }
    }
}

/// Fixed escalation order. Construction only goes through `new`, which pins the order.
#[derive(Debug, Clone)]
pub struct TierLadder {
    rungs: Vec<ModelTier>,
}

impl TierLadder {
    pub fn new(fast: ModelTier, robust: ModelTier) -> Self {
        Self {
            rungs: vec![fast, robust],
        }
    }

    pub fn rungs(&self) -> &[ModelTier] {
        &self.rungs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_instances() {
        let fast = ModelTier::fast("flash");
        let robust = ModelTier::robust("pro");
        assert_eq!(fast.cost_class, CostClass::Low);
        assert!(fast.supports_fast_mode);
        assert_eq!(robust.cost_class, CostClass::High);
        assert!(!robust.supports_fast_mode);
    }

    #[test]
    fn test_ladder_always_starts_with_fast() {
        let ladder = TierLadder::new(ModelTier::fast("flash"), ModelTier::robust("pro"));
        let kinds: Vec<_> = ladder.rungs().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TierKind::Fast, TierKind::Robust]);
    }
}
