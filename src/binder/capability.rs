//! 能力形状：对未知宿主成员的读 / 写 / 增减 / 按索引操作

use crate::host::{HostModel, HostValue, ObjectId, Target, ValueKind};

pub trait Readable {
    fn read(&self, host: &mut dyn HostModel) -> Option<i64>;
}

pub trait Writable {
    fn write(&self, host: &mut dyn HostModel, value: i64) -> bool;
}

pub trait Adjustable {
    fn adjust(&self, host: &mut dyn HostModel, delta: i64) -> bool;
}

/// 支持按槽位查找 / 移除 / 插入的容器
pub trait Indexed {
    fn index_of(&self, host: &mut dyn HostModel, entity: ObjectId) -> Option<usize>;
    fn remove_at(&self, host: &mut dyn HostModel, index: usize) -> bool;
    fn insert_at(&self, host: &mut dyn HostModel, entity: ObjectId, index: usize) -> bool;
}

/// 绑定到的字段或属性（二者至多一个）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberSlot {
    Field {
        name: String,
        ty: ValueKind,
        read_only: bool,
    },
    Property {
        name: String,
        ty: ValueKind,
        can_read: bool,
        can_write: bool,
    },
}

impl MemberSlot {
    pub fn name(&self) -> &str {
        match self {
            MemberSlot::Field { name, .. } | MemberSlot::Property { name, .. } => name,
        }
    }

    fn ty(&self) -> ValueKind {
        match self {
            MemberSlot::Field { ty, .. } | MemberSlot::Property { ty, .. } => *ty,
        }
    }
}

/// 方法句柄；`param` 为 None 表示无参 getter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHandle {
    pub name: String,
    pub param: Option<ValueKind>,
    pub returns: ValueKind,
}

impl MethodHandle {
    fn call_with(&self, host: &mut dyn HostModel, instance: ObjectId, value: i64) -> bool {
        let Some(arg) = self.param.and_then(|p| p.numeric_value(value)) else {
            return false;
        };
        host.invoke(Target::Instance(instance), &self.name, &[arg])
            .is_ok()
    }
}

/// 解析阶梯的哪一级给出了绑定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRung {
    Hints,
    Singleton,
    Heuristic,
    GlobalScan,
}

/// 绑定结果：实例 + 成员 / 方法句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTarget {
    pub instance: ObjectId,
    pub slot: Option<MemberSlot>,
    pub get: Option<MethodHandle>,
    pub set: Option<MethodHandle>,
    pub adjust: Option<MethodHandle>,
    pub via: ResolutionRung,
}

impl BindingTarget {
    fn read_slot(&self, host: &dyn HostModel) -> Option<i64> {
        let slot = self.slot.as_ref()?;
        if let MemberSlot::Property { can_read: false, .. } = slot {
            return None;
        }
        host.read(Target::Instance(self.instance), slot.name())
            .ok()?
            .as_i64()
    }

    fn write_slot(&self, host: &mut dyn HostModel, value: i64) -> bool {
        let Some(slot) = &self.slot else {
            return false;
        };
        let writable = match slot {
            MemberSlot::Property { can_write, .. } => *can_write,
            MemberSlot::Field { read_only, .. } => !read_only,
        };
        let Some(v) = slot.ty().numeric_value(value).filter(|_| writable) else {
            return false;
        };
        host.write(Target::Instance(self.instance), slot.name(), v)
            .is_ok()
    }
}

impl Readable for BindingTarget {
    fn read(&self, host: &mut dyn HostModel) -> Option<i64> {
        if let Some(get) = &self.get {
            let value = host
                .invoke(Target::Instance(self.instance), &get.name, &[])
                .ok()
                .as_ref()
                .and_then(HostValue::as_i64);
            if value.is_some() {
                return value;
            }
        }
        self.read_slot(host)
    }
}

impl Writable for BindingTarget {
    fn write(&self, host: &mut dyn HostModel, value: i64) -> bool {
        if let Some(set) = &self.set {
            if set.call_with(host, self.instance, value) {
                return true;
            }
        }
        self.write_slot(host, value)
    }
}

impl Adjustable for BindingTarget {
    fn adjust(&self, host: &mut dyn HostModel, delta: i64) -> bool {
        match &self.adjust {
            Some(adjust) => adjust.call_with(host, self.instance, delta),
            None => false,
        }
    }
}
