//! # Security XML Encoding
//!
//! Grant sets, permission sets and evidence travel between domains as
//! [`SecurityElement`] trees rather than through the generic serializer.
//!
//! ```text
//! <PermissionSet version="1">
//!   <IPermission class="FileRead" path="/srv/app"/>
//!   <IPermission class="Network" host="example.com"/>
//! </PermissionSet>
//!
//! <PermissionSet version="1" Unrestricted="true"/>
//!
//! <Evidence version="1">
//!   <Zone value="Internet"/>
//!   <StrongName identity="Lib, Version=1.0.0.0, Culture=neutral, PublicKeyToken=abcd"/>
//! </Evidence>
//! ```

use crate::domain::{
    EvidenceItem, GrantSet, Permission, PermissionSet, SecurityElement, SecurityZone,
    TrustError, TrustEvidence,
};
use std::path::PathBuf;

const VERSION: &str = "1";

/// A security object with a structural XML form.
pub trait SecurityEncodable: Sized {
    /// Encode as an element tree.
    fn to_element(&self) -> SecurityElement;

    /// Decode from an element tree.
    fn from_element(element: &SecurityElement) -> Result<Self, TrustError>;

    /// Encode as XML text.
    fn to_security_xml(&self) -> String {
        self.to_element().to_xml()
    }

    /// Decode from XML text.
    fn from_security_xml(xml: &str) -> Result<Self, TrustError> {
        let element =
            SecurityElement::parse(xml).map_err(|e| TrustError::InvalidSecurityXml(e.to_string()))?;
        Self::from_element(&element)
    }
}

fn invalid(message: impl Into<String>) -> TrustError {
    TrustError::InvalidSecurityXml(message.into())
}

fn expect_tag(element: &SecurityElement, tag: &str) -> Result<(), TrustError> {
    if element.tag == tag {
        Ok(())
    } else {
        Err(invalid(format!("expected <{tag}>, found <{}>", element.tag)))
    }
}

fn required<'a>(element: &'a SecurityElement, name: &str) -> Result<&'a str, TrustError> {
    element
        .attribute(name)
        .ok_or_else(|| invalid(format!("<{}> is missing '{name}'", element.tag)))
}

impl SecurityEncodable for Permission {
    fn to_element(&self) -> SecurityElement {
        let element = SecurityElement::new("IPermission").attr("class", self.class_name());
        match self {
            Self::FileRead(path) | Self::FileWrite(path) => {
                element.attr("path", path.to_string_lossy())
            }
            Self::Network(host) => element.attr("host", host.as_str()),
            Self::Environment(var) => element.attr("variable", var.as_str()),
            _ => element,
        }
    }

    fn from_element(element: &SecurityElement) -> Result<Self, TrustError> {
        expect_tag(element, "IPermission")?;
        let permission = match required(element, "class")? {
            "Execution" => Self::Execution,
            "FileRead" => Self::FileRead(PathBuf::from(required(element, "path")?)),
            "FileWrite" => Self::FileWrite(PathBuf::from(required(element, "path")?)),
            "Network" => Self::Network(required(element, "host")?.to_string()),
            "Reflection" => Self::Reflection,
            "Environment" => Self::Environment(required(element, "variable")?.to_string()),
            "UnmanagedCode" => Self::UnmanagedCode,
            "ControlEvidence" => Self::ControlEvidence,
            "ControlDomain" => Self::ControlDomain,
            other => return Err(invalid(format!("unknown permission class '{other}'"))),
        };
        Ok(permission)
    }
}

impl SecurityEncodable for PermissionSet {
    fn to_element(&self) -> SecurityElement {
        self.iter().fold(
            SecurityElement::new("PermissionSet").attr("version", VERSION),
            |set, permission| set.child(permission.to_element()),
        )
    }

    fn from_element(element: &SecurityElement) -> Result<Self, TrustError> {
        expect_tag(element, "PermissionSet")?;
        if element.attribute("Unrestricted") == Some("true") {
            return Err(invalid("unrestricted set where a finite set was expected"));
        }
        element
            .children_named("IPermission")
            .map(Permission::from_element)
            .collect()
    }
}

impl SecurityEncodable for GrantSet {
    fn to_element(&self) -> SecurityElement {
        match self {
            Self::Unrestricted => SecurityElement::new("PermissionSet")
                .attr("version", VERSION)
                .attr("Unrestricted", "true"),
            Self::Restricted(set) => set.to_element(),
        }
    }

    fn from_element(element: &SecurityElement) -> Result<Self, TrustError> {
        expect_tag(element, "PermissionSet")?;
        if element.attribute("Unrestricted") == Some("true") {
            return Ok(Self::Unrestricted);
        }
        PermissionSet::from_element(element).map(Self::Restricted)
    }
}

impl SecurityEncodable for EvidenceItem {
    fn to_element(&self) -> SecurityElement {
        match self {
            Self::Zone(zone) => SecurityElement::new("Zone").attr("value", zone.as_str()),
            Self::Url(url) => SecurityElement::new("Url").attr("value", url.as_str()),
            Self::Site(site) => SecurityElement::new("Site").attr("value", site.as_str()),
            Self::StrongName(identity) => {
                SecurityElement::new("StrongName").attr("identity", identity.to_string())
            }
            Self::Hash(digest) => SecurityElement::new("Hash").attr("value", digest.as_str()),
            Self::Custom { name, value } => SecurityElement::new("Custom")
                .attr("name", name.as_str())
                .with_text(value.as_str()),
        }
    }

    fn from_element(element: &SecurityElement) -> Result<Self, TrustError> {
        let item = match element.tag.as_str() {
            "Zone" => Self::Zone(required(element, "value")?.parse::<SecurityZone>().map_err(invalid)?),
            "Url" => Self::Url(required(element, "value")?.to_string()),
            "Site" => Self::Site(required(element, "value")?.to_string()),
            "StrongName" => Self::StrongName(
                required(element, "identity")?
                    .parse()
                    .map_err(|e: shared_types::IdentityError| invalid(e.to_string()))?,
            ),
            "Hash" => Self::Hash(required(element, "value")?.to_string()),
            "Custom" => Self::Custom {
                name: required(element, "name")?.to_string(),
                value: element.text.clone().unwrap_or_default(),
            },
            other => return Err(invalid(format!("unknown evidence <{other}>"))),
        };
        Ok(item)
    }
}

impl SecurityEncodable for TrustEvidence {
    fn to_element(&self) -> SecurityElement {
        self.items().iter().fold(
            SecurityElement::new("Evidence").attr("version", VERSION),
            |evidence, item| evidence.child(item.to_element()),
        )
    }

    fn from_element(element: &SecurityElement) -> Result<Self, TrustError> {
        expect_tag(element, "Evidence")?;
        element.children.iter().map(EvidenceItem::from_element).collect()
    }
}
