//! 内存宿主：运行时用闭包搭建类型 / 成员 / 方法，供演示世界和测试使用

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{
    HostCallback, HostError, HostModel, HostValue, MemberDesc, MemberShape, NodeId, ObjectId,
    Target, TypeDesc, ValueKind,
};

pub type MethodFn = Arc<
    dyn Fn(&mut MemoryHost, Option<ObjectId>, &[HostValue]) -> Result<HostValue, HostError>
        + Send
        + Sync,
>;

const CTOR: &str = ".ctor";

struct MethodDef {
    params: Vec<ValueKind>,
    is_static: bool,
    body: MethodFn,
}

struct TypeDef {
    members: Vec<MemberDesc>,
    methods: HashMap<String, Vec<MethodDef>>,
}

struct ObjectData {
    ty: TypeDesc,
    values: HashMap<String, HostValue>,
    owner: Option<NodeId>,
}

struct NodeData {
    name: String,
    tag: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<ObjectId>,
    /// 预制体节点不出现在场景遍历里
    live: bool,
}

struct ModuleData {
    name: String,
    types: Vec<TypeDesc>,
    broken: bool,
}

#[derive(Default)]
pub struct MemoryHost {
    modules: Vec<ModuleData>,
    types: HashMap<TypeDesc, TypeDef>,
    objects: HashMap<ObjectId, ObjectData>,
    nodes: BTreeMap<NodeId, NodeData>,
    statics: HashMap<(TypeDesc, String), HostValue>,
    assets: Vec<ObjectId>,
    listeners: HashMap<(ObjectId, String), Vec<HostCallback>>,
    next_id: u64,
}

fn default_value(kind: ValueKind) -> HostValue {
    match kind {
        ValueKind::Bool => HostValue::Bool(false),
        ValueKind::Int => HostValue::Int(0),
        ValueKind::Long => HostValue::Long(0),
        ValueKind::Float => HostValue::Float(0.0),
        _ => HostValue::Null,
    }
}

/// Null 可以填进任何引用形状的位置
fn accepts(expected: ValueKind, value: &HostValue) -> bool {
    let got = value.kind();
    got == expected
        || (got == ValueKind::Void
            && matches!(
                expected,
                ValueKind::Str
                    | ValueKind::Object
                    | ValueKind::Node
                    | ValueKind::List
                    | ValueKind::Map
            ))
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // --------------------------- 类型系统 ---------------------------

    pub fn add_module(&mut self, name: &str) {
        if !self.modules.iter().any(|m| m.name == name) {
            self.modules.push(ModuleData {
                name: name.to_string(),
                types: Vec::new(),
                broken: false,
            });
        }
    }

    /// 模拟枚举类型时抛异常的模块
    pub fn mark_module_broken(&mut self, name: &str) {
        self.add_module(name);
        if let Some(m) = self.modules.iter_mut().find(|m| m.name == name) {
            m.broken = true;
        }
    }

    pub fn define_type(&mut self, module: &str, full_name: &str) -> TypeBuilder<'_> {
        self.add_module(module);
        let desc = TypeDesc::new(module, full_name);
        if let Some(m) = self.modules.iter_mut().find(|m| m.name == module) {
            if !m.types.contains(&desc) {
                m.types.push(desc.clone());
            }
        }
        self.types.entry(desc.clone()).or_insert_with(|| TypeDef {
            members: Vec::new(),
            methods: HashMap::new(),
        });
        TypeBuilder { host: self, desc }
    }

    // --------------------------- 场景图 ---------------------------

    pub fn spawn_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.insert_node(name, parent, true)
    }

    /// 预制体：可以挂组件，但不属于活动场景
    pub fn spawn_prefab(&mut self, name: &str) -> NodeId {
        self.insert_node(name, None, false)
    }

    fn insert_node(&mut self, name: &str, parent: Option<NodeId>, live: bool) -> NodeId {
        let id = NodeId(self.alloc());
        self.nodes.insert(
            id,
            NodeData {
                name: name.to_string(),
                tag: None,
                parent: None,
                children: Vec::new(),
                components: Vec::new(),
                live,
            },
        );
        self.reparent(id, parent);
        id
    }

    pub fn set_tag(&mut self, node: NodeId, tag: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.tag = Some(tag.to_string());
        }
    }

    pub fn reparent(&mut self, node: NodeId, parent: Option<NodeId>) {
        let old = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(old) = old {
            if let Some(p) = self.nodes.get_mut(&old) {
                p.children.retain(|c| *c != node);
            }
        }
        if let Some(new) = parent {
            if let Some(p) = self.nodes.get_mut(&new) {
                p.children.push(node);
            }
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = parent;
        }
    }

    /// 往节点上挂一个组件，字段取默认值
    pub fn attach(&mut self, node: NodeId, ty: &TypeDesc) -> ObjectId {
        let id = self.create(ty);
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.owner = Some(node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.components.push(id);
        }
        id
    }

    /// 创建一个不属于任何节点的对象
    pub fn create(&mut self, ty: &TypeDesc) -> ObjectId {
        let id = ObjectId(self.alloc());
        let values = self
            .types
            .get(ty)
            .map(|def| {
                def.members
                    .iter()
                    .filter(|m| !m.is_static)
                    .filter_map(|m| match m.shape {
                        MemberShape::Field { ty, .. } | MemberShape::Property { ty, .. } => {
                            Some((m.name.clone(), default_value(ty)))
                        }
                        MemberShape::Method { .. } => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        self.objects.insert(
            id,
            ObjectData {
                ty: ty.clone(),
                values,
                owner: None,
            },
        );
        id
    }

    pub fn add_asset(&mut self, ty: &TypeDesc) -> ObjectId {
        let id = self.create(ty);
        self.assets.push(id);
        id
    }

    /// 直接写入实例值，绕过只读检查（搭建场景用）
    pub fn set(&mut self, obj: ObjectId, member: &str, value: impl Into<HostValue>) {
        if let Some(o) = self.objects.get_mut(&obj) {
            o.values.insert(member.to_string(), value.into());
        }
    }

    pub fn get(&self, obj: ObjectId, member: &str) -> Option<&HostValue> {
        self.objects.get(&obj).and_then(|o| o.values.get(member))
    }

    pub fn set_static(&mut self, ty: &TypeDesc, member: &str, value: impl Into<HostValue>) {
        self.statics
            .insert((ty.clone(), member.to_string()), value.into());
    }

    pub fn get_static(&self, ty: &TypeDesc, member: &str) -> Option<&HostValue> {
        self.statics.get(&(ty.clone(), member.to_string()))
    }

    /// 复制组件（通常挂在预制体上）到一个新的活动根节点
    pub fn instantiate(&mut self, src: ObjectId) -> Option<ObjectId> {
        let data = self.objects.get(&src)?;
        let ty = data.ty.clone();
        let values = data.values.clone();
        let name = data
            .owner
            .and_then(|n| self.nodes.get(&n))
            .map(|n| n.name.clone())
            .unwrap_or_else(|| ty.short_name().to_string());
        let node = self.spawn_node(&name, None);
        let id = self.attach(node, &ty);
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.values = values;
        }
        Some(id)
    }

    pub fn is_alive(&self, obj: ObjectId) -> bool {
        self.objects.contains_key(&obj)
    }

    /// 触发宿主事件，通知所有订阅者
    pub fn raise(&self, obj: ObjectId, event: &str, payload: &HostValue) -> usize {
        match self.listeners.get(&(obj, event.to_string())) {
            Some(list) => {
                for cb in list {
                    cb(payload);
                }
                list.len()
            }
            None => 0,
        }
    }

    fn remove_subtree(&mut self, node: NodeId) {
        self.reparent(node, None);
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(data) = self.nodes.remove(&n) {
                for c in data.components {
                    self.objects.remove(&c);
                    self.listeners.retain(|(o, _), _| *o != c);
                }
                stack.extend(data.children);
            }
        }
    }

    fn find_member(&self, ty: &TypeDesc, name: &str, is_static: bool) -> Option<&MemberDesc> {
        self.types.get(ty).and_then(|def| {
            def.members
                .iter()
                .find(|m| m.name == name && m.is_static == is_static && !m.is_method())
        })
    }

    fn missing(owner: &TypeDesc, member: &str) -> HostError {
        HostError::MissingMember {
            owner: owner.full_name.clone(),
            member: member.to_string(),
        }
    }

    fn resolve_target(&self, target: Target<'_>) -> Result<(TypeDesc, Option<ObjectId>), HostError> {
        match target {
            Target::Instance(obj) => {
                let data = self.objects.get(&obj).ok_or(HostError::MissingObject(obj))?;
                Ok((data.ty.clone(), Some(obj)))
            }
            Target::Static(ty) => {
                if self.types.contains_key(ty) {
                    Ok((ty.clone(), None))
                } else {
                    Err(HostError::MissingType(ty.full_name.clone()))
                }
            }
        }
    }
}

impl HostModel for MemoryHost {
    fn modules(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name.clone()).collect()
    }

    fn types_in(&self, module: &str) -> Result<Vec<TypeDesc>, HostError> {
        let m = self
            .modules
            .iter()
            .find(|m| m.name == module)
            .ok_or_else(|| HostError::ModuleUnavailable(module.to_string()))?;
        if m.broken {
            return Err(HostError::ModuleUnavailable(module.to_string()));
        }
        Ok(m.types.clone())
    }

    fn type_of(&self, obj: ObjectId) -> Result<TypeDesc, HostError> {
        self.objects
            .get(&obj)
            .map(|o| o.ty.clone())
            .ok_or(HostError::MissingObject(obj))
    }

    fn members(&self, ty: &TypeDesc) -> Vec<MemberDesc> {
        self.types
            .get(ty)
            .map(|d| d.members.clone())
            .unwrap_or_default()
    }

    fn read(&self, target: Target<'_>, member: &str) -> Result<HostValue, HostError> {
        let (ty, obj) = self.resolve_target(target)?;
        let desc = self
            .find_member(&ty, member, obj.is_none())
            .ok_or_else(|| Self::missing(&ty, member))?;
        if let MemberShape::Property { can_read: false, .. } = desc.shape {
            return Err(HostError::NotReadable(member.to_string()));
        }
        let value = match obj {
            Some(obj) => self.get(obj, member).cloned(),
            None => self.get_static(&ty, member).cloned(),
        };
        Ok(value.unwrap_or(HostValue::Null))
    }

    fn write(
        &mut self,
        target: Target<'_>,
        member: &str,
        value: HostValue,
    ) -> Result<(), HostError> {
        let (ty, obj) = self.resolve_target(target)?;
        let desc = self
            .find_member(&ty, member, obj.is_none())
            .ok_or_else(|| Self::missing(&ty, member))?;
        let expected = match desc.shape {
            MemberShape::Field { read_only: true, .. }
            | MemberShape::Property {
                can_write: false, ..
            } => return Err(HostError::ReadOnly(member.to_string())),
            MemberShape::Field { ty, .. } | MemberShape::Property { ty, .. } => ty,
            MemberShape::Method { .. } => return Err(Self::missing(&ty, member)),
        };
        if !accepts(expected, &value) {
            return Err(HostError::TypeMismatch {
                member: member.to_string(),
                expected,
            });
        }
        match obj {
            Some(obj) => self.set(obj, member, value),
            None => self.set_static(&ty, member, value),
        }
        Ok(())
    }

    fn invoke(
        &mut self,
        target: Target<'_>,
        method: &str,
        args: &[HostValue],
    ) -> Result<HostValue, HostError> {
        let (ty, obj) = self.resolve_target(target)?;
        let overloads = self
            .types
            .get(&ty)
            .and_then(|d| d.methods.get(method))
            .ok_or_else(|| Self::missing(&ty, method))?;
        let body = overloads
            .iter()
            .filter(|m| m.is_static == obj.is_none())
            .find(|m| {
                m.params.len() == args.len()
                    && m.params.iter().zip(args).all(|(p, a)| accepts(*p, a))
            })
            .map(|m| m.body.clone())
            .ok_or_else(|| HostError::Signature {
                member: method.to_string(),
                got: args.iter().map(HostValue::kind).collect(),
            })?;
        body(self, obj, args)
    }

    fn construct(&mut self, ty: &TypeDesc, args: &[HostValue]) -> Result<ObjectId, HostError> {
        if !self.types.contains_key(ty) {
            return Err(HostError::MissingType(ty.full_name.clone()));
        }
        let obj = self.create(ty);
        let has_ctor = self
            .types
            .get(ty)
            .is_some_and(|d| d.methods.contains_key(CTOR));
        if has_ctor || !args.is_empty() {
            if let Err(e) = self.invoke(Target::Instance(obj), CTOR, args) {
                self.objects.remove(&obj);
                return Err(e);
            }
        }
        Ok(obj)
    }

    fn destroy(&mut self, obj: ObjectId) -> Result<(), HostError> {
        let owner = self
            .objects
            .get(&obj)
            .ok_or(HostError::MissingObject(obj))?
            .owner;
        match owner {
            Some(node) => self.remove_subtree(node),
            None => {
                self.objects.remove(&obj);
                self.assets.retain(|a| *a != obj);
            }
        }
        Ok(())
    }

    fn subscribe(
        &mut self,
        obj: ObjectId,
        event: &str,
        callback: HostCallback,
    ) -> Result<(), HostError> {
        if !self.objects.contains_key(&obj) {
            return Err(HostError::MissingObject(obj));
        }
        self.listeners
            .entry((obj, event.to_string()))
            .or_default()
            .push(callback);
        Ok(())
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.live)
            .map(|(id, _)| *id)
            .collect()
    }

    fn node_name(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node).map(|n| n.name.clone())
    }

    fn node_tag(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node).and_then(|n| n.tag.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn components(&self, node: NodeId) -> Vec<ObjectId> {
        self.nodes
            .get(&node)
            .map(|n| n.components.clone())
            .unwrap_or_default()
    }

    fn owner(&self, obj: ObjectId) -> Option<NodeId> {
        self.objects.get(&obj).and_then(|o| o.owner)
    }

    fn assets(&self) -> Vec<ObjectId> {
        self.assets.clone()
    }
}

/// 类型构建器
pub struct TypeBuilder<'a> {
    host: &'a mut MemoryHost,
    desc: TypeDesc,
}

impl TypeBuilder<'_> {
    fn push(&mut self, name: &str, shape: MemberShape, is_static: bool) {
        if let Some(def) = self.host.types.get_mut(&self.desc) {
            def.members.push(MemberDesc {
                name: name.to_string(),
                shape,
                is_static,
            });
        }
    }

    pub fn field(mut self, name: &str, ty: ValueKind) -> Self {
        self.push(name, MemberShape::Field { ty, read_only: false }, false);
        self
    }

    pub fn readonly_field(mut self, name: &str, ty: ValueKind) -> Self {
        self.push(name, MemberShape::Field { ty, read_only: true }, false);
        self
    }

    pub fn property(mut self, name: &str, ty: ValueKind, can_read: bool, can_write: bool) -> Self {
        self.push(
            name,
            MemberShape::Property {
                ty,
                can_read,
                can_write,
            },
            false,
        );
        self
    }

    pub fn static_field(mut self, name: &str, ty: ValueKind, value: HostValue) -> Self {
        self.push(name, MemberShape::Field { ty, read_only: false }, true);
        self.host.set_static(&self.desc, name, value);
        self
    }

    pub fn static_property(mut self, name: &str, ty: ValueKind, value: HostValue) -> Self {
        self.push(
            name,
            MemberShape::Property {
                ty,
                can_read: true,
                can_write: false,
            },
            true,
        );
        self.host.set_static(&self.desc, name, value);
        self
    }

    pub fn method<F>(self, name: &str, params: &[ValueKind], returns: ValueKind, body: F) -> Self
    where
        F: Fn(&mut MemoryHost, Option<ObjectId>, &[HostValue]) -> Result<HostValue, HostError>
            + Send
            + Sync
            + 'static,
    {
        self.add_method(name, params, returns, false, Arc::new(body))
    }

    pub fn static_method<F>(
        self,
        name: &str,
        params: &[ValueKind],
        returns: ValueKind,
        body: F,
    ) -> Self
    where
        F: Fn(&mut MemoryHost, Option<ObjectId>, &[HostValue]) -> Result<HostValue, HostError>
            + Send
            + Sync
            + 'static,
    {
        self.add_method(name, params, returns, true, Arc::new(body))
    }

    pub fn constructor<F>(self, params: &[ValueKind], body: F) -> Self
    where
        F: Fn(&mut MemoryHost, Option<ObjectId>, &[HostValue]) -> Result<HostValue, HostError>
            + Send
            + Sync
            + 'static,
    {
        self.add_method(CTOR, params, ValueKind::Void, false, Arc::new(body))
    }

    fn add_method(
        mut self,
        name: &str,
        params: &[ValueKind],
        returns: ValueKind,
        is_static: bool,
        body: MethodFn,
    ) -> Self {
        if name != CTOR {
            self.push(
                name,
                MemberShape::Method {
                    params: params.to_vec(),
                    returns,
                },
                is_static,
            );
        }
        if let Some(def) = self.host.types.get_mut(&self.desc) {
            def.methods
                .entry(name.to_string())
                .or_default()
                .push(MethodDef {
                    params: params.to_vec(),
                    is_static,
                    body,
                });
        }
        self
    }

    pub fn build(self) -> TypeDesc {
        self.desc
    }
}
