//! Role policy. Operations are implemented once; which principal may invoke
//! them is decided here and enforced at the HTTP boundary.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, AsRefStr, EnumIter,
)]
pub enum Role {
  Admin,
  Superuser,
  ParishTreasurer,
  CouncilSecretary,
  SeniorPastor,
  Evangelist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum Capability {
  RegisterSelf,
  ViewMembers,
  ManageMembers,
  ManageSacraments,
  ViewLeaders,
  ManageLeaders,
  ViewFinance,
  ManageFinance,
  ViewReports,
  ViewSettings,
  ManageSettings,
  ViewAssets,
  ManageAssets,
  ViewNotifications,
  SendNotifications,
}

impl Capability {
  /// The view capability a management capability implies.
  fn implied_view(self) -> Option<Self> {
    use Capability::*;
    match self {
      ManageMembers | ManageSacraments => Some(ViewMembers),
      ManageLeaders => Some(ViewLeaders),
      ManageFinance => Some(ViewFinance),
      ManageSettings => Some(ViewSettings),
      ManageAssets => Some(ViewAssets),
      SendNotifications => Some(ViewNotifications),
      _ => None,
    }
  }
}

impl Role {
  /// Capabilities granted directly. `None` means every capability.
  fn grants(self) -> Option<&'static [Capability]> {
    use Capability::*;
    match self {
      Self::Admin | Self::Superuser => None,
      Self::ParishTreasurer => Some(&[
        ViewMembers,
        ManageFinance,
        ViewFinance,
        ViewReports,
        ViewSettings,
        ViewAssets,
      ]),
      Self::CouncilSecretary => Some(&[
        ViewMembers,
        ManageMembers,
        ManageSacraments,
        ManageLeaders,
        SendNotifications,
        ViewSettings,
        ViewAssets,
        ViewFinance,
        ViewReports,
      ]),
      Self::SeniorPastor => Some(&[
        ViewMembers,
        ManageSacraments,
        ViewLeaders,
        SendNotifications,
        ViewFinance,
        ViewReports,
        ViewSettings,
        ViewAssets,
      ]),
      Self::Evangelist => Some(&[ViewMembers, ViewLeaders, ViewSettings]),
    }
  }

  pub fn can(self, capability: Capability) -> bool {
    let Some(granted) = self.grants() else {
      return true;
    };
    granted
      .iter()
      .any(|&g| g == capability || g.implied_view() == Some(capability))
  }
}

/// The caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
  Anonymous,
  Operator { username: String, role: Role },
}

impl Principal {
  pub fn can(&self, capability: Capability) -> bool {
    match self {
      Self::Anonymous => capability == Capability::RegisterSelf,
      Self::Operator { role, .. } => role.can(capability),
    }
  }

  pub fn require(&self, capability: Capability) -> Result<()> {
    if self.can(capability) {
      Ok(())
    } else {
      tracing::debug!(principal = ?self, %capability, "permission denied");
      Err(Error::PermissionDenied)
    }
  }
}
