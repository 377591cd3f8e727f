//! 通货能力解析阶梯：提示 → 单例 / 任意实例 → 名字启发式 → 全场景扫描

use bevy::prelude::*;

use super::capability::{BindingTarget, MemberSlot, MethodHandle, ResolutionRung};
use super::hints::ResolutionHints;
use super::resolver::TypeResolver;
use crate::host::{HostModel, MemberShape, NodeId, ObjectId, Target, TypeDesc, ValueKind};

/// 通货成员的候选名（大小写不敏感精确匹配）
pub const CANDIDATE_NAMES: &[&str] = &["money", "credits", "gold", "balance", "currency", "cash"];

/// 常见单例访问器名，按顺序探测
pub const SINGLETON_NAMES: &[&str] = &["Instance", "instance", "Inst", "inst", "Singleton", "singleton"];

const ACTOR_MARKERS: &[&str] = &["Player", "Character"];

/// set / adjust 方法的单参数形状，按顺序尝试
const ONE_ARG_KINDS: &[ValueKind] = &[ValueKind::Int, ValueKind::Float, ValueKind::Long];

pub struct CapabilityBinder<'a> {
    hints: &'a ResolutionHints,
    player_tag: &'a str,
    debug: bool,
}

impl<'a> CapabilityBinder<'a> {
    pub fn new(hints: &'a ResolutionHints, player_tag: &'a str) -> Self {
        Self {
            hints,
            player_tag,
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn trace(&self, msg: impl FnOnce() -> String) {
        if self.debug {
            info!("[currency] {}", msg());
        } else {
            debug!("[currency] {}", msg());
        }
    }

    /// 依次尝试每一级，第一个成功者胜出；全部失败返回 None
    pub fn resolve(&self, host: &dyn HostModel, types: &mut TypeResolver) -> Option<BindingTarget> {
        let bound = if self.hints.is_empty() {
            None
        } else {
            self.resolve_with_hints(host, types)
        };
        let bound = bound
            .or_else(|| self.heuristic_scan(host))
            .or_else(|| self.global_scan(host));
        match &bound {
            Some(b) => self.trace(|| {
                format!(
                    "bound {:?} via {:?} (member: {:?})",
                    b.instance,
                    b.via,
                    b.slot.as_ref().map(MemberSlot::name)
                )
            }),
            None => self.trace(|| "no currency capability found".to_string()),
        }
        bound
    }

    fn resolve_with_hints(
        &self,
        host: &dyn HostModel,
        types: &mut TypeResolver,
    ) -> Option<BindingTarget> {
        let root = self
            .hints
            .container
            .as_deref()
            .and_then(|needle| find_node_containing(host, needle));
        if let Some(needle) = &self.hints.container {
            self.trace(|| format!("container `{needle}` → {:?}", root.and_then(|r| host.node_name(r))));
        }

        let ty = self
            .hints
            .type_name
            .as_deref()
            .and_then(|name| types.resolve(host, name));
        if let Some(name) = &self.hints.type_name {
            self.trace(|| format!("type hint `{name}` → {:?}", ty.as_ref().map(|t| &t.full_name)));
        }

        let mut slot = None;
        let (instance, via) = match (&ty, root) {
            (Some(ty), root) => {
                let scoped = root.and_then(|r| {
                    host.components_in_children(r)
                        .into_iter()
                        .find(|c| host.type_of(*c).is_ok_and(|t| &t == ty))
                });
                match scoped {
                    Some(c) => (c, ResolutionRung::Hints),
                    None => (singleton_or_any(host, ty)?, ResolutionRung::Singleton),
                }
            }
            (None, Some(root)) => {
                let (c, s) = host
                    .components_in_children(root)
                    .into_iter()
                    .find_map(|c| self.bind_member(host, c).map(|s| (c, s)))?;
                slot = Some(s);
                (c, ResolutionRung::Hints)
            }
            (None, None) => return None,
        };

        let target = self.finish(host, instance, slot, via);
        let methods_ok = target.get.is_some() && (target.set.is_some() || target.adjust.is_some());
        if methods_ok || target.slot.is_some() {
            Some(target)
        } else {
            self.trace(|| format!("hinted instance {instance:?} exposes no usable member"));
            None
        }
    }

    fn heuristic_scan(&self, host: &dyn HostModel) -> Option<BindingTarget> {
        if let Some(tagged) = host.find_tagged(self.player_tag) {
            if let Some(b) = self.scan_node(host, tagged) {
                return Some(b);
            }
        }
        host.nodes()
            .into_iter()
            .filter(|n| {
                host.node_name(*n)
                    .is_some_and(|name| ACTOR_MARKERS.iter().any(|m| name.contains(m)))
            })
            .find_map(|n| self.scan_node(host, n))
    }

    fn scan_node(&self, host: &dyn HostModel, node: NodeId) -> Option<BindingTarget> {
        host.components_in_children(node).into_iter().find_map(|c| {
            let slot = self.bind_member(host, c)?;
            Some(self.finish(host, c, Some(slot), ResolutionRung::Heuristic))
        })
    }

    fn global_scan(&self, host: &dyn HostModel) -> Option<BindingTarget> {
        host.nodes()
            .into_iter()
            .flat_map(|n| host.components(n))
            .find_map(|c| {
                let slot = self.bind_member(host, c)?;
                Some(self.finish(host, c, Some(slot), ResolutionRung::GlobalScan))
            })
    }

    /// 在实例类型上解析提示里的 get / set / adjust 方法
    fn finish(
        &self,
        host: &dyn HostModel,
        instance: ObjectId,
        slot: Option<MemberSlot>,
        via: ResolutionRung,
    ) -> BindingTarget {
        let ty = host.type_of(instance).ok();
        let method = |name: &Option<String>, f: fn(&dyn HostModel, &TypeDesc, &str) -> Option<MethodHandle>| {
            match (name.as_deref(), &ty) {
                (Some(n), Some(t)) => f(host, t, n),
                _ => None,
            }
        };
        let get = method(&self.hints.get_method, getter);
        let set = method(&self.hints.set_method, one_arg_method);
        let adjust = method(&self.hints.adjust_method, one_arg_method);
        let slot = slot.or_else(|| self.bind_member(host, instance));
        BindingTarget {
            instance,
            slot,
            get,
            set,
            adjust,
            via,
        }
    }

    /// 在组件上找数值成员：先看提示成员名，再查候选名表
    pub fn bind_member(&self, host: &dyn HostModel, obj: ObjectId) -> Option<MemberSlot> {
        let ty = host.type_of(obj).ok()?;
        let members: Vec<_> = host
            .members(&ty)
            .into_iter()
            .filter(|m| !m.is_static)
            .collect();

        if let Some(prefer) = self.hints.member.as_deref() {
            let named: Vec<_> = members.iter().filter(|m| m.name == prefer).collect();
            let prop = named.iter().find_map(|m| match m.shape {
                MemberShape::Property {
                    ty,
                    can_read: true,
                    can_write,
                } if ty.is_numeric() => Some(MemberSlot::Property {
                    name: m.name.clone(),
                    ty,
                    can_read: true,
                    can_write,
                }),
                _ => None,
            });
            if prop.is_some() {
                return prop;
            }
            let field = named.iter().find_map(|m| numeric_field(&m.name, &m.shape));
            if field.is_some() {
                return field;
            }
        }

        let is_candidate =
            |name: &str| CANDIDATE_NAMES.iter().any(|c| c.eq_ignore_ascii_case(name));
        let prop = members
            .iter()
            .filter(|m| is_candidate(&m.name))
            .find_map(|m| match m.shape {
                MemberShape::Property {
                    ty,
                    can_read: true,
                    can_write: true,
                } if ty.is_numeric() => Some(MemberSlot::Property {
                    name: m.name.clone(),
                    ty,
                    can_read: true,
                    can_write: true,
                }),
                _ => None,
            });
        if prop.is_some() {
            return prop;
        }
        members
            .iter()
            .filter(|m| is_candidate(&m.name))
            .find_map(|m| numeric_field(&m.name, &m.shape))
    }
}

fn numeric_field(name: &str, shape: &MemberShape) -> Option<MemberSlot> {
    match *shape {
        MemberShape::Field { ty, read_only } if ty.is_numeric() => Some(MemberSlot::Field {
            name: name.to_string(),
            ty,
            read_only,
        }),
        _ => None,
    }
}

/// 第一个名字包含 `needle` 的节点（大小写不敏感）
pub fn find_node_containing(host: &dyn HostModel, needle: &str) -> Option<NodeId> {
    let needle = needle.to_lowercase();
    host.nodes().into_iter().find(|n| {
        host.node_name(*n)
            .is_some_and(|name| !name.is_empty() && name.to_lowercase().contains(&needle))
    })
}

/// 先探测静态单例访问器（属性优先于字段），再退回场景中的任意实例
pub fn singleton_or_any(host: &dyn HostModel, ty: &TypeDesc) -> Option<ObjectId> {
    let statics: Vec<_> = host.members(ty).into_iter().filter(|m| m.is_static).collect();
    let lookup = |want_property: bool| {
        SINGLETON_NAMES.iter().find_map(|name| {
            statics
                .iter()
                .filter(|m| m.name == *name)
                .filter(|m| matches!(m.shape, MemberShape::Property { .. }) == want_property)
                .filter(|m| !m.is_method())
                .find_map(|_| host.read(Target::Static(ty), name).ok()?.as_object())
        })
    };
    lookup(true)
        .or_else(|| lookup(false))
        .or_else(|| host.instances_of(ty).into_iter().next())
}

fn getter(host: &dyn HostModel, ty: &TypeDesc, name: &str) -> Option<MethodHandle> {
    host.members_named(ty, name)
        .into_iter()
        .filter(|m| !m.is_static)
        .find_map(|m| match m.shape {
            MemberShape::Method { params, returns } if params.is_empty() && returns.is_numeric() => {
                Some(MethodHandle {
                    name: m.name,
                    param: None,
                    returns,
                })
            }
            _ => None,
        })
}

fn one_arg_method(host: &dyn HostModel, ty: &TypeDesc, name: &str) -> Option<MethodHandle> {
    let overloads: Vec<_> = host
        .members_named(ty, name)
        .into_iter()
        .filter(|m| !m.is_static)
        .collect();
    ONE_ARG_KINDS.iter().find_map(|kind| {
        overloads.iter().find_map(|m| match &m.shape {
            MemberShape::Method { params, returns } if params.as_slice() == [*kind] => {
                Some(MethodHandle {
                    name: m.name.clone(),
                    param: Some(*kind),
                    returns: *returns,
                })
            }
            _ => None,
        })
    })
}
