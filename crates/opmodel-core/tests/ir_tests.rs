use opmodel_core::config::{FailurePolicy, NamingStrategy};
use opmodel_core::error::TransformError;
use opmodel_core::ir::grouping::{GroupBy, group_operations};
use opmodel_core::ir::{HttpMethod, IrOperation, IrParameterLocation, IrSpec, IrType, StatusCode};
use opmodel_core::parse;
use opmodel_core::transform::{self, TransformOptions};

const PETSTORE_V2: &str = include_str!("fixtures/petstore-v2.yaml");
const PETSTORE_V3: &str = include_str!("fixtures/petstore-v3.yaml");
const BROKEN: &str = include_str!("fixtures/broken-refs.yaml");

fn build(yaml: &str) -> IrSpec {
    let spec = parse::from_yaml(yaml).unwrap();
    transform::transform(&spec).unwrap()
}

fn op<'a>(ir: &'a IrSpec, name: &str) -> &'a IrOperation {
    ir.operations
        .iter()
        .find(|op| op.name.camel_case == name)
        .unwrap_or_else(|| panic!("should have operation {name}"))
}

fn statuses(codes: impl IntoIterator<Item = StatusCode>) -> Vec<String> {
    codes.into_iter().map(|s| s.to_string()).collect()
}

#[test]
fn transform_petstore_v2() {
    let ir = build(PETSTORE_V2);

    assert_eq!(ir.info.title, "Swagger Petstore");
    assert_eq!(ir.servers.len(), 1);
    assert_eq!(ir.servers[0].url, "https://petstore.example.com/v2");
    assert_eq!(ir.operations.len(), 7);
    assert!(ir.failures.is_empty());

    let names: Vec<&str> = ir
        .operations
        .iter()
        .map(|op| op.name.camel_case.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "listPets",
            "createPet",
            "showPetById",
            "updatePet",
            "deletePet",
            "postPhotos",
            "getService"
        ]
    );
}

#[test]
fn v2_inherited_path_parameter() {
    let ir = build(PETSTORE_V2);
    let show = op(&ir, "showPetById");

    assert_eq!(show.method, HttpMethod::Get);
    assert_eq!(show.path, "/pets/{petId}");
    let path = show.parameters.path();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0].original_name, "pet_id");
    assert_eq!(path[0].param_type, IrType::Integer);
    assert!(path[0].required);

    assert_eq!(statuses(show.results.iter().map(|r| r.status)), vec!["200"]);
    assert_eq!(show.results[0].result_type, IrType::Ref("Pet".to_string()));
    assert_eq!(statuses(show.errors.iter().map(|e| e.status)), vec!["404"]);
    assert_eq!(show.errors[0].description.as_deref(), Some("Pet not found"));
    assert_eq!(show.dependencies, vec!["Pet"]);
}

#[test]
fn v2_override_moves_parameter_between_locations() {
    let ir = build(PETSTORE_V2);
    let update = op(&ir, "updatePet");

    assert!(update.parameters.path().is_empty());
    let query = update.parameters.query();
    assert_eq!(query.len(), 1);
    assert_eq!(query[0].name.camel_case, "petId");
    assert_eq!(query[0].param_type, IrType::String);

    let body = update.parameters.body().expect("should have body");
    assert_eq!(body.original_name, "pet");
    assert_eq!(body.param_type, IrType::Ref("Pet".to_string()));
    assert_eq!(update.results[0].result_type, IrType::Void);
}

#[test]
fn v2_list_pets() {
    let ir = build(PETSTORE_V2);
    let list = op(&ir, "listPets");

    // api-version is ignored by default
    assert_eq!(list.parameters.len(), 1);
    let limit = list.parameters.get("limit").unwrap();
    assert_eq!(limit.location, IrParameterLocation::Query);
    assert_eq!(limit.default, Some(serde_json::json!(20)));
    assert_eq!(
        limit.description.as_deref(),
        Some("How many items to return at one time")
    );

    assert_eq!(
        statuses(list.results.iter().map(|r| r.status)),
        vec!["200", "default"]
    );
    assert!(list.errors.is_empty());
    assert_eq!(list.response_header.as_deref(), Some("x-next"));
    assert_eq!(list.dependencies, vec!["Pet", "Error"]);
    assert_eq!(list.summary.as_deref(), Some("List all pets"));
}

#[test]
fn v2_form_and_deprecated() {
    let ir = build(PETSTORE_V2);

    let photo = op(&ir, "postPhotos");
    assert_eq!(photo.service.pascal_case, "Photos");
    assert_eq!(photo.parameters.path().len(), 1);
    let form = photo.parameters.form();
    assert_eq!(form.len(), 2);
    assert_eq!(form[0].param_type, IrType::Binary);
    assert_eq!(form[1].param_type, IrType::String);

    let delete = op(&ir, "deletePet");
    assert!(delete.deprecated);
    assert_eq!(statuses(delete.results.iter().map(|r| r.status)), vec!["204"]);
    assert_eq!(statuses(delete.errors.iter().map(|e| e.status)), vec!["4XX"]);

    let inventory = op(&ir, "getService");
    assert_eq!(inventory.summary, None);
    assert_eq!(
        inventory.results[0].result_type,
        IrType::Map(Box::new(IrType::Integer))
    );
}

#[test]
fn modules_grouped_by_service() {
    let ir = build(PETSTORE_V2);
    let modules: Vec<(&str, usize)> = ir
        .modules
        .iter()
        .map(|m| (m.name.pascal_case.as_str(), m.operations.len()))
        .collect();
    assert_eq!(modules, vec![("Pets", 5), ("Photos", 1), ("Service", 1)]);
}

#[test]
fn transform_petstore_v3() {
    let ir = build(PETSTORE_V3);

    assert_eq!(ir.servers[0].url, "https://api.example.com/v3");
    assert_eq!(ir.servers[0].description.as_deref(), Some("production"));
    assert_eq!(ir.operations.len(), 4);

    let get = op(&ir, "getPet");
    assert_eq!(get.description.as_deref(), Some("Fetch a pet.\nBy id."));
    assert_eq!(get.parameters.path().len(), 1);
    assert_eq!(get.results[0].media_type.as_deref(), Some("application/json"));
}

#[test]
fn v3_request_body_and_headers() {
    let ir = build(PETSTORE_V3);
    let replace = op(&ir, "replacePet");

    assert!(replace.parameters.path().is_empty());
    assert_eq!(replace.parameters.query().len(), 1);
    let body = replace.parameters.body().unwrap();
    assert_eq!(body.name.camel_case, "pet");
    assert!(body.required);
    assert_eq!(body.media_type.as_deref(), Some("application/json"));
    assert_eq!(body.param_type, IrType::Ref("PetInput".to_string()));

    assert_eq!(
        statuses(replace.results.iter().map(|r| r.status)),
        vec!["200", "202"]
    );
    assert_eq!(statuses(replace.errors.iter().map(|e| e.status)), vec!["5XX"]);
    assert_eq!(replace.response_header.as_deref(), Some("ETag"));
    assert_eq!(replace.dependencies, vec!["PetInput", "Pet"]);
}

#[test]
fn v3_form_body_and_fallback_name() {
    let ir = build(PETSTORE_V3);
    let order = op(&ir, "postStore");

    assert_eq!(order.service.pascal_case, "Store");
    let body = order.parameters.body().unwrap();
    assert_eq!(body.original_name, "formData");
    assert_eq!(
        body.media_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(order.response_header.as_deref(), Some("Location"));

    let list = op(&ir, "listPets");
    let limit = list.parameters.get("limit").unwrap();
    assert_eq!(limit.default, Some(serde_json::json!(10)));
    assert!(list.parameters.get("apiVersion").is_none());
}

#[test]
fn route_based_naming_and_aliases() {
    let spec = parse::from_yaml(PETSTORE_V3).unwrap();
    let mut options = TransformOptions {
        naming_strategy: NamingStrategy::UseRouteBased,
        ..TransformOptions::default()
    };
    options
        .aliases
        .insert("listPets".to_string(), "fetchAllPets".to_string());
    let ir = transform::transform_with_options(&spec, &options).unwrap();

    let names: Vec<&str> = ir
        .operations
        .iter()
        .map(|op| op.name.camel_case.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["getPet", "updatePet", "createStoreOrder", "fetchAllPets"]
    );
}

#[test]
fn broken_refs_abort() {
    let spec = parse::from_yaml(BROKEN).unwrap();
    let err = transform::transform(&spec).unwrap_err();
    assert!(matches!(err, TransformError::Operation(_)));
    insta::assert_snapshot!(
        err.to_string(),
        @"operation failed: GET /pets/{id}: malformed parameter `#/components/parameters/Missing`: reference target not found: #/components/parameters/Missing"
    );
}

#[test]
fn broken_refs_skip() {
    let spec = parse::from_yaml(BROKEN).unwrap();
    let options = TransformOptions {
        failure_policy: FailurePolicy::Skip,
        ..TransformOptions::default()
    };
    let ir = transform::transform_with_options(&spec, &options).unwrap();

    assert_eq!(ir.operations.len(), 1);
    assert_eq!(ir.operations[0].name.camel_case, "health");

    let failures: Vec<String> = ir.failures.iter().map(|f| f.to_string()).collect();
    insta::assert_snapshot!(failures.join("\n"), @r"
    GET /pets/{id}: malformed parameter `#/components/parameters/Missing`: reference target not found: #/components/parameters/Missing
    DELETE /pets/{id}: malformed parameter `#/components/parameters/Missing`: reference target not found: #/components/parameters/Missing
    GET /owners: malformed response `200`: reference target not found: #/components/schemas/Owner
    POST /owners: malformed response `2x1`: invalid status code: 2x1
    ");
}

const INCOMPLETE: &str = r##"
openapi: 3.0.3
info: {title: Incomplete, version: "1"}
paths:
  /good:
    get:
      operationId: good
      responses: {"200": {description: ok}}
  /bad:
    get:
      operationId: bad
      parameters:
        - {name: filter, schema: {type: string}}
      responses: {"200": {description: ok}}
  /lost:
    get:
      operationId: lost
      responses:
        "200": {description: ok}
        "404":
          description: gone
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Problem"}
"##;

#[test]
fn incomplete_nodes_fail_only_their_operation() {
    let spec = parse::from_yaml(INCOMPLETE).unwrap();
    let options = TransformOptions {
        failure_policy: FailurePolicy::Skip,
        ..TransformOptions::default()
    };
    let ir = transform::transform_with_options(&spec, &options).unwrap();

    let names: Vec<&str> = ir
        .operations
        .iter()
        .map(|op| op.name.camel_case.as_str())
        .collect();
    assert_eq!(names, vec!["good"]);

    let failures: Vec<String> = ir.failures.iter().map(|f| f.to_string()).collect();
    insta::assert_snapshot!(failures.join("\n"), @r"
    GET /bad: malformed parameter `filter`: missing required field: in
    GET /lost: malformed response `404`: reference target not found: #/components/schemas/Problem
    ");

    let err = transform::transform(&spec).unwrap_err();
    assert!(matches!(
        err,
        TransformError::Operation(ref op) if op.path == "/bad" && op.method == HttpMethod::Get
    ));
}

#[test]
fn transform_is_deterministic() {
    let spec = parse::from_yaml(PETSTORE_V2).unwrap();
    let first = transform::transform(&spec).unwrap();
    let second = transform::transform(&spec).unwrap();
    assert_eq!(first.operations, second.operations);
}

#[test]
fn load_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("petstore.yaml");
    std::fs::write(&path, PETSTORE_V3).unwrap();
    let ir = transform::load(&path, &TransformOptions::default()).unwrap();
    assert_eq!(ir.info.version, "2.0.0");
}

#[test]
fn group_by_route() {
    let ir = build(PETSTORE_V2);
    let groups = group_operations(&ir, GroupBy::Route);
    let names: Vec<&str> = groups.iter().map(|g| g.name.original.as_str()).collect();
    assert_eq!(names, vec!["pets", "store"]);
    assert_eq!(groups[0].operation_indices.len(), 6);

    let per_op = group_operations(&ir, GroupBy::Operation);
    assert_eq!(per_op.len(), ir.operations.len());
}
