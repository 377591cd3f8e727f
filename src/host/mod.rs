//! 宿主对象模型：只通过运行时内省访问宿主拥有的类型 / 成员 / 场景节点

pub mod memory;
pub mod sample;
pub mod value;

use bevy::prelude::*;
use thiserror::Error;

pub use value::{HostValue, MemberDesc, MemberShape, NodeId, ObjectId, TypeDesc, ValueKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("type `{0}` is not loaded")]
    MissingType(String),
    #[error("`{owner}` has no member `{member}`")]
    MissingMember { owner: String, member: String },
    #[error("object {0:?} does not exist")]
    MissingObject(ObjectId),
    #[error("module `{0}` could not enumerate its types")]
    ModuleUnavailable(String),
    #[error("member `{0}` is not readable")]
    NotReadable(String),
    #[error("member `{0}` is read-only")]
    ReadOnly(String),
    #[error("`{member}` has no overload taking {got:?}")]
    Signature { member: String, got: Vec<ValueKind> },
    #[error("`{member}` expects a {expected:?} value")]
    TypeMismatch { member: String, expected: ValueKind },
    #[error("`{member}` raised: {message}")]
    Invocation { member: String, message: String },
}

/// 成员访问目标：实例或类型静态成员
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Instance(ObjectId),
    Static(&'a TypeDesc),
}

/// 宿主事件回调，参数为事件携带的值
pub type HostCallback = Box<dyn Fn(&HostValue) + Send + Sync>;

/// 宿主对象图视图
///
/// 所有操作都可能失败；调用方把失败当作"这一步没成功"，不向上传播。
pub trait HostModel {
    fn modules(&self) -> Vec<String>;
    fn types_in(&self, module: &str) -> Result<Vec<TypeDesc>, HostError>;
    fn type_of(&self, obj: ObjectId) -> Result<TypeDesc, HostError>;
    fn members(&self, ty: &TypeDesc) -> Vec<MemberDesc>;

    fn read(&self, target: Target<'_>, member: &str) -> Result<HostValue, HostError>;
    fn write(&mut self, target: Target<'_>, member: &str, value: HostValue)
    -> Result<(), HostError>;
    fn invoke(
        &mut self,
        target: Target<'_>,
        method: &str,
        args: &[HostValue],
    ) -> Result<HostValue, HostError>;
    fn construct(&mut self, ty: &TypeDesc, args: &[HostValue]) -> Result<ObjectId, HostError>;
    /// 销毁对象；组件连同其节点子树一起销毁
    fn destroy(&mut self, obj: ObjectId) -> Result<(), HostError>;
    fn subscribe(
        &mut self,
        obj: ObjectId,
        event: &str,
        callback: HostCallback,
    ) -> Result<(), HostError>;

    /// 场景中的活动节点（不含预制体）
    fn nodes(&self) -> Vec<NodeId>;
    fn node_name(&self, node: NodeId) -> Option<String>;
    fn node_tag(&self, node: NodeId) -> Option<String>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn components(&self, node: NodeId) -> Vec<ObjectId>;
    fn owner(&self, obj: ObjectId) -> Option<NodeId>;
    /// 非场景对象（数据资产）
    fn assets(&self) -> Vec<ObjectId>;

    fn find_tagged(&self, tag: &str) -> Option<NodeId> {
        self.nodes()
            .into_iter()
            .find(|n| self.node_tag(*n).as_deref() == Some(tag))
    }

    /// 节点自身及所有后代上的组件，深度优先
    fn components_in_children(&self, node: NodeId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            out.extend(self.components(n));
            let mut kids = self.children(n);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    fn component_of_type(&self, node: NodeId, ty: &TypeDesc) -> Option<ObjectId> {
        self.components(node)
            .into_iter()
            .find(|c| self.type_of(*c).is_ok_and(|t| &t == ty))
    }

    /// 场景中所有该类型的组件
    fn instances_of(&self, ty: &TypeDesc) -> Vec<ObjectId> {
        self.nodes()
            .into_iter()
            .flat_map(|n| self.components(n))
            .filter(|c| self.type_of(*c).is_ok_and(|t| &t == ty))
            .collect()
    }

    fn members_named(&self, ty: &TypeDesc, name: &str) -> Vec<MemberDesc> {
        self.members(ty)
            .into_iter()
            .filter(|m| m.name == name)
            .collect()
    }
}

/// 宿主桥接资源：整个插件只通过它触碰宿主
#[derive(Resource)]
pub struct HostBridge(pub Box<dyn HostModel + Send + Sync>);

impl HostBridge {
    pub fn new(host: impl HostModel + Send + Sync + 'static) -> Self {
        Self(Box::new(host))
    }

    pub fn model(&self) -> &dyn HostModel {
        self.0.as_ref()
    }

    pub fn model_mut(&mut self) -> &mut dyn HostModel {
        self.0.as_mut()
    }
}
