//! 角色模型
//!
//! 角色集合是封闭的：认证、配额、权限分发都对枚举做穷尽匹配，
//! 不做运行时字符串查表。

use serde::{Deserialize, Serialize};

/// 用户角色（封闭枚举）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// 客户管理员：管理本租户的站点、设备、员工与套餐视图。
    Admin,
    /// 项目经理：站点运营管理，受套餐人数限额约束。
    ProjectManager,
    /// 现场主管：记录车辆进出与证据，受套餐人数限额约束。
    Supervisor,
}

impl Role {
    /// 从数据库字符串解析（小写）。
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "project_manager" => Some(Self::ProjectManager),
            "supervisor" => Some(Self::Supervisor),
            _ => None,
        }
    }

    /// 数据库字符串表示（小写）。
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ProjectManager => "project_manager",
            Self::Supervisor => "supervisor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_db_strings() {
        for role in [Role::Admin, Role::ProjectManager, Role::Supervisor] {
            assert_eq!(Role::from_db(role.as_db()), Some(role));
        }
        assert_eq!(Role::from_db("operator"), None);
    }
}
