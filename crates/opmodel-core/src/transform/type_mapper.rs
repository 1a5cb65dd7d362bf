use crate::error::ResolveError;
use crate::ir::IrType;
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, TypeSet};

use super::name_normalizer::normalize_name;

/// Convert a parsed `SchemaOrRef` to an `IrType`.
///
/// A `$ref` becomes `IrType::Ref` with the PascalCase name of its target;
/// the target must exist in the document.
pub fn schema_or_ref_to_ir_type(
    refs: &RefResolver<'_>,
    schema_or_ref: &SchemaOrRef,
) -> Result<IrType, ResolveError> {
    match schema_or_ref {
        SchemaOrRef::Ref { ref_path } => {
            let name = refs.schema_name(ref_path)?;
            Ok(IrType::Ref(normalize_name(&name).pascal_case))
        }
        SchemaOrRef::Schema(schema) => schema_to_ir_type(refs, schema),
    }
}

/// Convert a parsed `Schema` to an `IrType`. `nullable: true` widens the
/// result to a union with `Null`.
pub fn schema_to_ir_type(refs: &RefResolver<'_>, schema: &Schema) -> Result<IrType, ResolveError> {
    let base = map_schema(refs, schema)?;
    if schema.nullable == Some(true) && !matches!(base, IrType::Null | IrType::Any) {
        return Ok(IrType::Union(vec![base, IrType::Null]));
    }
    Ok(base)
}

fn map_all(refs: &RefResolver<'_>, schemas: &[SchemaOrRef]) -> Result<Vec<IrType>, ResolveError> {
    schemas
        .iter()
        .map(|s| schema_or_ref_to_ir_type(refs, s))
        .collect()
}

fn map_schema(refs: &RefResolver<'_>, schema: &Schema) -> Result<IrType, ResolveError> {
    // Handle composition first
    if !schema.one_of.is_empty() {
        return Ok(IrType::Union(map_all(refs, &schema.one_of)?));
    }
    if !schema.any_of.is_empty() {
        return Ok(IrType::Union(map_all(refs, &schema.any_of)?));
    }
    if !schema.all_of.is_empty() {
        if let [single] = schema.all_of.as_slice() {
            return schema_or_ref_to_ir_type(refs, single);
        }
        let mut parts = map_all(refs, &schema.all_of)?;
        if !schema.properties.is_empty() {
            parts.push(object_fields(refs, schema)?);
        }
        return Ok(IrType::Intersection(parts));
    }

    // String enums become literal unions; other enums keep their base type.
    if !schema.enum_values.is_empty() {
        let mut literals: Vec<IrType> = schema
            .enum_values
            .iter()
            .filter_map(|v| v.as_str().map(|s| IrType::StringLiteral(s.to_string())))
            .collect();
        match literals.len() {
            0 => {}
            1 => return Ok(literals.remove(0)),
            _ => return Ok(IrType::Union(literals)),
        }
    }

    if let Some(val) = &schema.const_value {
        if let Some(s) = val.as_str() {
            return Ok(IrType::StringLiteral(s.to_string()));
        }
    }

    match &schema.schema_type {
        Some(TypeSet::Single(t)) => map_single(refs, schema, *t),
        Some(TypeSet::Multiple(types)) => {
            let has_null = types.contains(&SchemaType::Null);
            let mut variants = types
                .iter()
                .filter(|t| **t != SchemaType::Null)
                .map(|t| map_single(refs, schema, *t))
                .collect::<Result<Vec<_>, _>>()?;
            match (variants.len(), has_null) {
                (0, true) => Ok(IrType::Null),
                (0, false) => Ok(IrType::Any),
                (1, false) => Ok(variants.remove(0)),
                _ => {
                    if has_null {
                        variants.push(IrType::Null);
                    }
                    Ok(IrType::Union(variants))
                }
            }
        }
        None => {
            // No type specified: infer from properties or items
            if !schema.properties.is_empty() || schema.additional_properties.is_some() {
                resolve_object_type(refs, schema)
            } else if let Some(items) = &schema.items {
                Ok(IrType::Array(Box::new(schema_or_ref_to_ir_type(refs, items)?)))
            } else {
                Ok(IrType::Any)
            }
        }
    }
}

fn map_single(
    refs: &RefResolver<'_>,
    schema: &Schema,
    schema_type: SchemaType,
) -> Result<IrType, ResolveError> {
    Ok(match schema_type {
        SchemaType::String => match schema.format.as_deref() {
            Some("date-time" | "date") => IrType::DateTime,
            Some("binary") => IrType::Binary,
            _ => IrType::String,
        },
        SchemaType::Number => IrType::Number,
        SchemaType::Integer => IrType::Integer,
        SchemaType::Boolean => IrType::Boolean,
        SchemaType::Null => IrType::Null,
        SchemaType::File => IrType::Binary,
        SchemaType::Array => match &schema.items {
            Some(items) => IrType::Array(Box::new(schema_or_ref_to_ir_type(refs, items)?)),
            None => IrType::Array(Box::new(IrType::Any)),
        },
        SchemaType::Object => resolve_object_type(refs, schema)?,
    })
}

fn resolve_object_type(refs: &RefResolver<'_>, schema: &Schema) -> Result<IrType, ResolveError> {
    if !schema.properties.is_empty() {
        return object_fields(refs, schema);
    }
    Ok(match &schema.additional_properties {
        Some(AdditionalProperties::Schema(s)) => {
            IrType::Map(Box::new(schema_or_ref_to_ir_type(refs, s)?))
        }
        Some(AdditionalProperties::Bool(true)) => IrType::Map(Box::new(IrType::Any)),
        Some(AdditionalProperties::Bool(false)) | None => IrType::Any,
    })
}

fn object_fields(refs: &RefResolver<'_>, schema: &Schema) -> Result<IrType, ResolveError> {
    let fields = schema
        .properties
        .iter()
        .map(|(name, prop)| {
            let required = schema.required.contains(name);
            Ok((name.clone(), schema_or_ref_to_ir_type(refs, prop)?, required))
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;
    Ok(IrType::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::from_yaml;
    use crate::parse::spec::OpenApiSpec;

    fn spec() -> OpenApiSpec {
        from_yaml(
            r##"
openapi: 3.0.3
info: {title: T, version: "1"}
components:
  schemas:
    Pet: {type: object}
    pet_tag: {type: string}
"##,
        )
        .unwrap()
    }

    fn schema(yaml: &str) -> SchemaOrRef {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn map(yaml: &str) -> Result<IrType, ResolveError> {
        let spec = spec();
        let refs = RefResolver::new(&spec);
        schema_or_ref_to_ir_type(&refs, &schema(yaml))
    }

    #[test]
    fn test_primitives() {
        assert_eq!(map("{type: string}").unwrap(), IrType::String);
        assert_eq!(map("{type: integer}").unwrap(), IrType::Integer);
        assert_eq!(
            map("{type: string, format: date-time}").unwrap(),
            IrType::DateTime
        );
        assert_eq!(map("{type: file}").unwrap(), IrType::Binary);
        assert_eq!(map("{}").unwrap(), IrType::Any);
    }

    #[test]
    fn test_ref_is_pascal_cased() {
        assert_eq!(
            map(r##"{$ref: "#/components/schemas/pet_tag"}"##).unwrap(),
            IrType::Ref("PetTag".to_string())
        );
    }

    #[test]
    fn test_unknown_ref_is_an_error() {
        let err = map(r##"{type: array, items: {$ref: "#/components/schemas/Nope"}}"##)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::RefTargetNotFound("#/components/schemas/Nope".to_string())
        );
    }

    #[test]
    fn test_array_of_refs() {
        let ty = map(r##"{type: array, items: {$ref: "#/components/schemas/Pet"}}"##).unwrap();
        assert_eq!(ty, IrType::Array(Box::new(IrType::Ref("Pet".to_string()))));
        assert_eq!(ty.dependencies(), vec!["Pet"]);
    }

    #[test]
    fn test_nullable_widens_to_union() {
        assert_eq!(
            map("{type: string, nullable: true}").unwrap(),
            IrType::Union(vec![IrType::String, IrType::Null])
        );
    }

    #[test]
    fn test_string_enum() {
        assert_eq!(
            map("{type: string, enum: [a, b]}").unwrap(),
            IrType::Union(vec![
                IrType::StringLiteral("a".to_string()),
                IrType::StringLiteral("b".to_string()),
            ])
        );
        assert_eq!(map("{type: integer, enum: [1, 2]}").unwrap(), IrType::Integer);
    }

    #[test]
    fn test_type_array_with_null() {
        assert_eq!(
            map("{type: [integer, 'null']}").unwrap(),
            IrType::Union(vec![IrType::Integer, IrType::Null])
        );
    }

    #[test]
    fn test_object_and_map() {
        assert_eq!(
            map("{type: object, properties: {id: {type: integer}}, required: [id]}").unwrap(),
            IrType::Object(vec![("id".to_string(), IrType::Integer, true)])
        );
        assert_eq!(
            map("{type: object, additionalProperties: {type: string}}").unwrap(),
            IrType::Map(Box::new(IrType::String))
        );
    }

    #[test]
    fn test_all_of_intersection() {
        let ty = map(
            r##"
allOf:
  - $ref: "#/components/schemas/Pet"
  - type: object
    properties:
      extra: {type: boolean}
"##,
        )
        .unwrap();
        assert_eq!(
            ty,
            IrType::Intersection(vec![
                IrType::Ref("Pet".to_string()),
                IrType::Object(vec![("extra".to_string(), IrType::Boolean, false)]),
            ])
        );
    }
}
