use std::collections::VecDeque;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::host::ObjectId;

// --------------------------- 资源 ---------------------------

/// 进行中的重抽批次；存在即表示有批次在跑，新的触发会被拒绝
#[derive(Resource, Debug, Clone)]
pub struct RerollPass {
    pub id: Uuid,
    pub queue: VecDeque<ObjectId>,
    pub total: usize,
    pub success: usize,
    pub fail: usize,
    /// 开始前已扣的费用
    pub charged: i64,
}

impl RerollPass {
    pub fn new(seq: u64, targets: Vec<ObjectId>, charged: i64) -> Self {
        Self {
            id: pass_uuid(seq),
            total: targets.len(),
            queue: targets.into(),
            success: 0,
            fail: 0,
            charged,
        }
    }

    pub fn processed(&self) -> usize {
        self.success + self.fail
    }
}

/// 同一序号总得到同一个 id
pub fn pass_uuid(seq: u64) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("item-reroll-pass-{seq}").as_bytes())
}

/// 已开始过的批次数
#[derive(Resource, Debug, Default)]
pub struct PassCounter(pub u64);

/// 等待玩家按下新的触发键
#[derive(Resource, Debug, Default)]
pub struct RebindMode {
    pub waiting: bool,
}

#[derive(Resource)]
pub struct RerollRng(pub StdRng);

impl RerollRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for RerollRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_ids_are_stable_per_sequence() {
        assert_eq!(pass_uuid(3), pass_uuid(3));
        assert_ne!(pass_uuid(3), pass_uuid(4));
        let pass = RerollPass::new(1, vec![ObjectId(5), ObjectId(6)], 100);
        assert_eq!(pass.total, 2);
        assert_eq!(pass.processed(), 0);
        assert_eq!(pass.id.get_version_num(), 5);
    }
}
