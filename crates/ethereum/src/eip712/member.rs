//! Resolution of device member paths against the domain and message values.

use super::{EIP712_DOMAIN, TypeDictionary, TypedDataError, TypedValue, parse_array_type};

/// The value and declared type a member path points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMember<'a> {
    /// `None` if the path leads through a value that is absent or has the wrong shape.
    pub value: Option<&'a TypedValue>,
    pub type_name: &'a str,
}

/// Walks `path` from its root: `0` is the domain, `1` the message.
///
/// Each further index selects a struct member by declaration position or an array element by
/// position. Steps are driven by the declared types; a value that does not have the declared
/// shape yields a member without value rather than an error.
pub fn resolve_member<'a>(
    path: &[u32],
    domain: &'a TypedValue,
    message: &'a TypedValue,
    primary_type: &'a str,
    types: &'a TypeDictionary,
) -> Result<ResolvedMember<'a>, TypedDataError> {
    let (&root, indices) = path.split_first().ok_or(TypedDataError::EmptyMemberPath)?;
    let (mut value, mut type_name) = match root {
        0 => (Some(domain), EIP712_DOMAIN),
        1 => (Some(message), primary_type),
        root => return Err(TypedDataError::InvalidRootIndex(root)),
    };

    for &index in indices {
        if let Some((entry, _)) = parse_array_type(type_name) {
            value =
                value.and_then(TypedValue::as_array).and_then(|items| items.get(index as usize));
            type_name = entry;
        } else if let Some(fields) = types.get(type_name) {
            let field = fields.get(index as usize).ok_or_else(|| {
                TypedDataError::MemberIndexOutOfRange { type_name: type_name.to_string(), index }
            })?;
            value = value.and_then(TypedValue::as_object).and_then(|obj| obj.get(&field.name));
            type_name = &field.declared_type;
        } else {
            return Err(TypedDataError::NotAContainer {
                path: path.to_vec(),
                type_name: type_name.to_string(),
            });
        }
    }

    Ok(ResolvedMember { value, type_name })
}
