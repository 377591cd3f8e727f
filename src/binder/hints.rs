use serde_derive::{Deserialize, Serialize};

/// 操作者提供的通货绑定提示，全部可选
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionHints {
    #[serde(rename = "hint_type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(rename = "hint_member", skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// 节点名的子串（大小写不敏感）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(rename = "method_get", skip_serializing_if = "Option::is_none")]
    pub get_method: Option<String>,
    #[serde(rename = "method_set", skip_serializing_if = "Option::is_none")]
    pub set_method: Option<String>,
    #[serde(rename = "method_adjust", skip_serializing_if = "Option::is_none")]
    pub adjust_method: Option<String>,
}

fn clean(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl ResolutionHints {
    /// 空白字符串视为未提供
    pub fn normalized(self) -> Self {
        Self {
            type_name: clean(self.type_name),
            member: clean(self.member),
            container: clean(self.container),
            get_method: clean(self.get_method),
            set_method: clean(self.set_method),
            adjust_method: clean(self.adjust_method),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.type_name.is_none()
            && self.member.is_none()
            && self.container.is_none()
            && self.get_method.is_none()
            && self.set_method.is_none()
            && self.adjust_method.is_none()
    }
}
