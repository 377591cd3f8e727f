/// 递增费用账本
///
/// `current` 永远不低于 `base`；溢出时饱和到 `i64::MAX`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostLedger {
    base: i64,
    step: i64,
    current: i64,
}

impl CostLedger {
    /// `persisted` 为上次保存的当前费用
    pub fn new(base: i64, step: i64, persisted: Option<i64>) -> Self {
        let base = base.max(0);
        Self {
            base,
            step: step.max(0),
            current: persisted.unwrap_or(base).max(base),
        }
    }

    pub fn base(&self) -> i64 {
        self.base
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    /// 本次应收金额
    pub fn charge_amount(&self) -> i64 {
        self.current.max(self.base)
    }

    /// 一次成功的批次之后调用
    pub fn advance(&mut self) -> i64 {
        self.current = self.current.saturating_add(self.step).max(self.base);
        self.current
    }

    /// 外部价格变化；非正数忽略。返回是否有变化
    pub fn rebase(&mut self, base: i64) -> bool {
        if base <= 0 || base == self.base {
            return false;
        }
        self.base = base;
        self.current = self.current.max(base);
        true
    }
}
