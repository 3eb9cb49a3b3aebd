//! PrivilegeOracle の実装

use std::collections::HashSet;
use std::net::IpAddr;

use crate::domain::PrivilegeOracle;

/// 設定で与えられた IP アドレスからの呼び出しにだけモデレーター権限を与える
#[derive(Debug, Clone, Default)]
pub struct AllowListPrivilegeOracle {
    moderators: HashSet<IpAddr>,
}

impl AllowListPrivilegeOracle {
    pub fn new(moderators: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            moderators: moderators.into_iter().map(normalize).collect(),
        }
    }
}

impl PrivilegeOracle for AllowListPrivilegeOracle {
    fn is_privileged(&self, origin: IpAddr) -> bool {
        self.moderators.contains(&normalize(origin))
    }
}

/// IPv4-mapped IPv6 (`::ffff:a.b.c.d`) は IPv4 として扱う
fn normalize(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}
