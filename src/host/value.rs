use std::fmt;

/// 宿主对象句柄（组件 / 资产 / 普通对象）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// 场景图节点句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// 宿主侧的动态值
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Str(String),
    Object(ObjectId),
    Node(NodeId),
    List(Vec<HostValue>),
    Map(Vec<(HostValue, HostValue)>),
}

impl HostValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            HostValue::Null => ValueKind::Void,
            HostValue::Bool(_) => ValueKind::Bool,
            HostValue::Int(_) => ValueKind::Int,
            HostValue::Long(_) => ValueKind::Long,
            HostValue::Float(_) => ValueKind::Float,
            HostValue::Str(_) => ValueKind::Str,
            HostValue::Object(_) => ValueKind::Object,
            HostValue::Node(_) => ValueKind::Node,
            HostValue::List(_) => ValueKind::List,
            HostValue::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// 整数值原样返回，浮点按 round-half-to-even 取整
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            HostValue::Int(v) => Some(v as i64),
            HostValue::Long(v) => Some(v),
            HostValue::Float(v) if v.is_finite() => Some(v.round_ties_even() as i64),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            HostValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            HostValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match *self {
            HostValue::Object(id) => Some(id),
            _ => None,
        }
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Int(v)
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Long(v)
    }
}

impl From<f32> for HostValue {
    fn from(v: f32) -> Self {
        HostValue::Float(v)
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Str(v.to_string())
    }
}

impl From<ObjectId> for HostValue {
    fn from(v: ObjectId) -> Self {
        HostValue::Object(v)
    }
}

/// 值 / 参数 / 返回值的形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Void,
    Bool,
    Int,
    Long,
    Float,
    Str,
    Object,
    Node,
    List,
    Map,
}

impl ValueKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Long | ValueKind::Float)
    }

    /// 把整数余额转换成该形状的宿主值；超出 i32 范围时返回 None
    pub fn numeric_value(self, v: i64) -> Option<HostValue> {
        match self {
            ValueKind::Int => i32::try_from(v).ok().map(HostValue::Int),
            ValueKind::Long => Some(HostValue::Long(v)),
            ValueKind::Float => Some(HostValue::Float(v as f32)),
            _ => None,
        }
    }
}

/// 宿主类型描述：所在模块 + 全限定名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    pub module: String,
    pub full_name: String,
}

impl TypeDesc {
    pub fn new(module: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            full_name: full_name.into(),
        }
    }

    /// `Ns.Outer+Inner` → `Inner`
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit(|c| c == '.' || c == '+')
            .next()
            .unwrap_or(&self.full_name)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.full_name == name || self.short_name() == name
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.full_name, self.module)
    }
}

/// 成员形状
#[derive(Debug, Clone, PartialEq)]
pub enum MemberShape {
    Field {
        ty: ValueKind,
        read_only: bool,
    },
    Property {
        ty: ValueKind,
        can_read: bool,
        can_write: bool,
    },
    Method {
        params: Vec<ValueKind>,
        returns: ValueKind,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDesc {
    pub name: String,
    pub shape: MemberShape,
    pub is_static: bool,
}

impl MemberDesc {
    pub fn is_method(&self) -> bool {
        matches!(self.shape, MemberShape::Method { .. })
    }
}
