use crate::custom_type::{CustomTypeInfo, CustomTypeMember, UnionCaseKind};

/// Classifies a member name against a type's custom-type shape into the
/// dispatch the Custom-type handler understands (§4.3). The metadata
/// store calls this once it already knows a type is a record/union/
/// delegate and has the member's source name in hand.
pub fn classify_method(custom: &CustomTypeInfo, name: &str) -> Option<CustomTypeMember> {
    match custom {
        CustomTypeInfo::Delegate => match name {
            "Invoke" => Some(CustomTypeMember::DelegateInvoke),
            "op_Addition" => Some(CustomTypeMember::DelegateCombine),
            "op_Equality" => Some(CustomTypeMember::DelegateEqual),
            "ToString" => Some(CustomTypeMember::DelegateToString),
            _ => None,
        },
        CustomTypeInfo::Record { optional: _, .. } => {
            if let Some(field) = name.strip_prefix("get_") {
                Some(CustomTypeMember::RecordGet(field.to_string()))
            } else if let Some(field) = name.strip_prefix("set_") {
                Some(CustomTypeMember::RecordSet(field.to_string()))
            } else if name == "ToString" {
                Some(CustomTypeMember::RecordToString)
            } else {
                None
            }
        }
        CustomTypeInfo::Union { cases, .. } => {
            if name == "get_Tag" {
                return Some(CustomTypeMember::UnionGetTag);
            }
            if let Some(case_name) = name.strip_prefix("get_Is") {
                return Some(CustomTypeMember::UnionIsCase(case_name.to_string()));
            }
            if let Some(case_name) = name.strip_prefix("New") {
                if cases.iter().any(|c| c.name == case_name) {
                    return Some(CustomTypeMember::UnionNewCase(case_name.to_string()));
                }
            }
            if let Some(case_name) = name.strip_prefix("get_") {
                if cases
                    .iter()
                    .any(|c| c.name == case_name && matches!(c.kind, UnionCaseKind::Singleton | UnionCaseKind::Constant(_)))
                {
                    return Some(CustomTypeMember::UnionGetCase(case_name.to_string()));
                }
            }
            None
        }
        CustomTypeInfo::UnionCase { case, .. } => {
            if let Some(field) = name.strip_prefix("get_") {
                if case.fields.iter().any(|f| f == field) {
                    return Some(CustomTypeMember::UnionCaseGetField(field.to_string()));
                }
            }
            None
        }
    }
}
