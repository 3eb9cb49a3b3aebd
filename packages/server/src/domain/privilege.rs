//! PrivilegeOracle trait 定義

use std::net::IpAddr;

/// 呼び出し元のネットワーク上の発信元からモデレーター権限の有無を答える
///
/// 結果はキャッシュせず、変更系の呼び出しのたびに問い合わせる。
pub trait PrivilegeOracle: Send + Sync {
    fn is_privileged(&self, origin: IpAddr) -> bool;
}
