use regex::Regex;
use sgen_core::error::BuildError;
use sgen_core::{CodeGenerator, CodegenApp, Document, GenOpts, GeneratedFile, TemplateRegistry, build_app};
use sgen_go_server::templates::SERVER_BUILDER;
use sgen_go_server::{GoLanguageOpts, GoServerGenerator, registry};

const SIMPLE_SEARCH: &str = include_str!("fixtures/simplesearch.yml");
const SHIPYARD: &str = include_str!("fixtures/shipyard.yml");
const TRAILING_SLASH: &str = include_str!("fixtures/trailing-slash.yml");
const DEEPER_CONSUMES: &str = include_str!("fixtures/deeper-consumes.yml");

fn app(yaml: &str, opts: &GenOpts) -> CodegenApp {
    let doc = Document::load_str(yaml, true).expect("fixture should load");
    build_app(&doc, opts, &GoLanguageOpts).expect("fixture should build")
}

fn generate(yaml: &str, opts: &GenOpts) -> Vec<GeneratedFile> {
    GoServerGenerator::new()
        .generate(&app(yaml, opts), &registry())
        .expect("generation should succeed")
}

fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    match files.iter().find(|f| f.path == path) {
        Some(f) => &f.content,
        None => {
            let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
            panic!("{path} not generated, got {paths:#?}")
        }
    }
}

fn assert_matches(content: &str, patterns: &[&str]) {
    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        assert!(re.is_match(content), "missing {pattern:?} in:\n{content}");
    }
}

fn module_opts() -> GenOpts {
    GenOpts {
        module_path: Some("example.com/petshop".to_string()),
        ..GenOpts::default()
    }
}

#[test]
fn urlencoded_consumer_is_bound_to_discard() {
    let built = app(SIMPLE_SEARCH, &GenOpts::default());
    assert_eq!(built.consumers.len(), 1);
    assert_eq!(built.consumers[0].name, "Urlform");
    assert_eq!(built.consumers[0].implementation, "runtime.DiscardConsumer");

    let files = generate(SIMPLE_SEARCH, &GenOpts::default());
    let builder = file(&files, "restapi/operations/simple_search_api.go");
    assert_matches(
        builder,
        &[
            r"UrlformConsumer:\s+runtime\.DiscardConsumer,",
            r"JSONProducer:\s+runtime\.JSONProducer\(\),",
            r#"result\["application/x-www-form-urlencoded"\] = o\.UrlformConsumer"#,
            r#"o\.handlers\["POST"\]\["/search"\] = NewSearch\(o\.context, o\.SearchHandler\)"#,
            r"SearchHandler SearchHandler\n",
            r"func NewSimpleSearchAPI\(spec \*loads\.Document\) \*SimpleSearchAPI",
        ],
    );
    let configure = file(&files, "restapi/configure_simple_search.go");
    assert_matches(
        configure,
        &[
            r"api\.UrlformConsumer = runtime\.DiscardConsumer",
            r"api\.JSONProducer = runtime\.JSONProducer\(\)",
            r"api\.SearchHandler = operations\.SearchHandlerFunc\(",
        ],
    );
    assert_eq!(builder.matches("UrlformConsumer runtime.Consumer").count(), 1);
}

#[test]
fn form_parameters_are_bound() {
    let files = generate(SIMPLE_SEARCH, &GenOpts::default());
    let params = file(&files, "restapi/operations/search_parameters.go");
    assert_matches(
        params,
        &[
            r"package operations",
            r"Q string\n",
            r"Limit \*int32\n",
            r"fds := runtime\.Values\(r\.Form\)",
            r#"fds\.GetOK\("q"\)"#,
            r"swag\.ConvertInt32\(raw\)",
            r#""github.com/go-openapi/swag""#,
        ],
    );
    let responses = file(&files, "restapi/operations/search_responses.go");
    assert_matches(
        responses,
        &[
            r"const SearchOKCode int = 200",
            r"Payload \[\]string",
            r"payload = \[\]string\{\}",
        ],
    );
}

#[test]
fn doc_file_describes_the_api() {
    let files = generate(SIMPLE_SEARCH, &GenOpts::default());
    insta::assert_snapshot!(file(&files, "restapi/doc.go"), @r"
    // Code generated by sgen; DO NOT EDIT.

    // Package restapi Simple Search
    //
    //	Schemes:
    //	  http
    //	BasePath: /
    //	Version: 1.0.0
    //
    //	Consumes:
    //	  - application/x-www-form-urlencoded
    //
    //	Produces:
    //	  - application/json
    //
    // swagger:meta
    package restapi
    ");
}

#[test]
fn multipart_upload_with_basic_auth() {
    let files = generate(SHIPYARD, &GenOpts::default());
    let builder = file(&files, "restapi/operations/shipyard_api.go");
    assert_matches(
        builder,
        &[
            r"MultipartformConsumer:\s+runtime\.DiscardConsumer,",
            r#"result\["multipart/form-data"\] = o\.MultipartformConsumer"#,
            r#""shipyard/restapi/operations/manifests""#,
            r"ManifestsUploadManifestHandler manifests\.UploadManifestHandler",
            r#"o\.handlers\["POST"\]\["/manifests"\] = manifests\.NewUploadManifest\(o\.context, o\.ManifestsUploadManifestHandler\)"#,
            r"BasicAuth func\(string, string\) \(interface\{\}, error\)",
            r#"case "basic":"#,
        ],
    );

    let op = file(&files, "restapi/operations/manifests/upload_manifest.go");
    assert_matches(
        op,
        &[
            r"package manifests",
            r"type UploadManifestHandlerFunc func\(UploadManifestParams, interface\{\}\) middleware\.Responder",
            r"o\.Context\.Authorize\(r, route\)",
        ],
    );

    let params = file(&files, "restapi/operations/manifests/upload_manifest_parameters.go");
    assert_matches(
        params,
        &[
            r#"\n\t"io"\n"#,
            r"Manifest io\.ReadCloser",
            r#"r\.FormFile\("manifest"\)"#,
            r"Vessel \*string",
            r"r\.ParseMultipartForm\(32 << 20\)",
        ],
    );

    let responses = file(&files, "restapi/operations/manifests/upload_manifest_responses.go");
    assert_matches(
        responses,
        &[
            r"const UploadManifestCreatedCode int = 201",
            r"func NewUploadManifestDefault\(code int\) \*UploadManifestDefault",
            r"rw\.WriteHeader\(o\._statusCode\)",
            r"rw\.WriteHeader\(201\)",
        ],
    );
}

#[test]
fn trailing_slash_routes_stay_distinct() {
    let built = app(TRAILING_SLASH, &GenOpts::default());
    let gets = &built.routes["GET"];
    assert_eq!(gets.len(), 2);
    assert_eq!(gets["/widgets"].operation_id, "listWidgets");
    assert_eq!(gets["/widgets/"].operation_id, "listWidgetsSlash");
    assert!(built.route("POST", "/trailingslashpath/").is_some());

    let files = generate(TRAILING_SLASH, &GenOpts::default());
    let builder = file(&files, "restapi/operations/widgets_api.go");
    assert_matches(
        builder,
        &[
            r#"o\.handlers\["GET"\]\["/widgets"\] = alpha\.NewListWidgets\("#,
            r#"o\.handlers\["GET"\]\["/widgets/"\] = beta\.NewListWidgetsSlash\("#,
            r#"o\.handlers\["POST"\]\["/trailingslashpath/"\] = alpha\.NewCreateTrailing\("#,
        ],
    );
}

#[test]
fn tag_filter_keeps_intersecting_operations() {
    let opts = GenOpts {
        tags: vec!["alpha".to_string()],
        ..GenOpts::default()
    };
    let built = app(TRAILING_SLASH, &opts);
    let ids: Vec<&str> = built.operations.iter().map(|op| op.id.as_str()).collect();
    assert_eq!(ids, vec!["listWidgets", "createTrailing"]);
    assert!(built.route("GET", "/widgets/").is_none());

    let files = generate(TRAILING_SLASH, &opts);
    assert!(!files.iter().any(|f| f.path.contains("list_widgets_slash")));
    let builder = file(&files, "restapi/operations/widgets_api.go");
    assert!(!builder.contains("ListWidgetsSlash"));
}

#[test]
fn json_consumers_and_models() {
    let built = app(DEEPER_CONSUMES, &module_opts());
    assert_eq!(built.consumers.len(), 1);
    assert_eq!(
        built.consumers[0].media_types,
        vec!["application/json", "application/vnd.shop+json"]
    );

    let files = generate(DEEPER_CONSUMES, &module_opts());
    let builder = file(&files, "restapi/operations/pet_shop_api.go");
    assert_matches(
        builder,
        &[
            r"JSONConsumer:\s+runtime\.JSONConsumer\(\),",
            r#"result\["application/json"\] = o\.JSONConsumer"#,
            r#"result\["application/vnd\.shop\+json"\] = o\.JSONConsumer"#,
            r#"result\["application/json"\] = o\.JSONProducer"#,
            r#""example\.com/petshop/restapi/operations/pets""#,
            r"APIKeyAuth func\(string\) \(interface\{\}, error\)",
            r#"o\.handlers\["DELETE"\]\["/pets/\{petId\}"\] = pets\.NewDeletePet\("#,
        ],
    );

    let find = file(&files, "restapi/operations/pets/find_pets_parameters.go");
    assert_matches(
        find,
        &[
            r"Tags \[\]string",
            r"Limit \*int32",
            r"limitDefault := int32\(20\)",
            r"Limit: &limitDefault,",
            r"Since \*strfmt\.DateTime",
            r"strfmt\.ParseDateTime\(raw\)",
            r#"swag\.SplitByFormat\(raw, "csv"\)"#,
        ],
    );

    let add = file(&files, "restapi/operations/pets/add_pet_parameters.go");
    assert_matches(
        add,
        &[
            r"Body \*models\.Pet",
            r"var body models\.Pet",
            r"o\.Body = &body",
            r#""example\.com/petshop/models""#,
            r#"errors\.Required\("body", "body", ""\)"#,
        ],
    );

    let delete = file(&files, "restapi/operations/pets/delete_pet.go");
    assert!(!delete.contains("Authorize"));
    let delete_params = file(&files, "restapi/operations/pets/delete_pet_parameters.go");
    assert_matches(delete_params, &[r"PetID int64\n", r#"route\.Params\.GetOK\("petId"\)"#]);

    let find_responses = file(&files, "restapi/operations/pets/find_pets_responses.go");
    assert_matches(
        find_responses,
        &[
            r"Payload \[\]\*models\.Pet",
            r"XRateLimit int32",
            r#"rw\.Header\(\)\.Set\("X-Rate-Limit", fmt\.Sprint\(o\.XRateLimit\)\)"#,
            r"Payload \*models\.Error",
        ],
    );

    let pet = file(&files, "models/pet.go");
    assert_matches(
        pet,
        &[
            r"type Pet struct",
            r"// Read Only: true",
            r"ID int64 `json:.id,omitempty.`",
            r"Name string `json:.name.`",
            r"Status PetStatus",
            r"Born strfmt\.Date",
            r#""github.com/go-openapi/strfmt""#,
        ],
    );
    let status = file(&files, "models/pet_status.go");
    assert_matches(
        status,
        &[
            r"type PetStatus string",
            r#"PetStatusAvailable PetStatus = "available""#,
            r"func \(m PetStatus\) Validate\(formats strfmt\.Registry\) error",
        ],
    );
}

#[test]
fn inclusion_flags_gate_files() {
    let defaults = generate(SIMPLE_SEARCH, &GenOpts::default());
    assert!(defaults.iter().any(|f| f.path == "restapi/embedded_spec.go"));
    assert!(!defaults.iter().any(|f| f.path.starts_with("cmd/")));

    let opts = GenOpts {
        exclude_spec: true,
        include_main: true,
        include_model: false,
        include_support: false,
        ..GenOpts::default()
    };
    let files = generate(SIMPLE_SEARCH, &opts);
    assert!(!files.iter().any(|f| f.path == "restapi/embedded_spec.go"));
    assert!(!files.iter().any(|f| f.path == "restapi/doc.go"));
    let main = file(&files, "cmd/simple-search-server/main.go");
    assert_matches(main, &[r"operations\.NewSimpleSearchAPI\(swaggerSpec\)"]);
}

#[test]
fn embedded_spec_uses_raw_strings() {
    let files = generate(SIMPLE_SEARCH, &GenOpts::default());
    let embedded = file(&files, "restapi/embedded_spec.go");
    assert_matches(
        embedded,
        &[
            r"SwaggerJSON = json\.RawMessage\(\[\]byte\(`\{",
            r#""operationId": "search""#,
        ],
    );
}

#[test]
fn every_file_ends_with_one_newline() {
    for f in generate(DEEPER_CONSUMES, &module_opts()) {
        assert!(f.content.ends_with('\n'), "{}", f.path);
        assert!(!f.content.ends_with("\n\n"), "{}", f.path);
        assert!(!f.content.contains("\n\n\n"), "{}", f.path);
    }
}

#[test]
fn invalid_spec_fails_to_build() {
    let yaml = SIMPLE_SEARCH.to_string()
        + "  /search/{id}:\n    get:\n      operationId: search\n      responses:\n        200: {description: ok}\n";
    let doc = Document::load_str(&yaml, true).unwrap();
    let err = build_app(&doc, &GenOpts::default(), &GoLanguageOpts).unwrap_err();
    match err {
        BuildError::Validation(v) => assert_eq!(v.findings.len(), 2, "{:#?}", v.findings),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn render_errors_are_not_defects() {
    let mut registry = registry();
    registry.register(SERVER_BUILDER, "{{ app.no_such_field }}").unwrap();
    let err = GoServerGenerator::new()
        .generate(&app(SIMPLE_SEARCH, &GenOpts::default()), &registry)
        .unwrap_err();
    assert!(!err.is_defect());
    assert!(err.to_string().contains(SERVER_BUILDER));
}

#[test]
#[should_panic(expected = "serverBuilder")]
fn missing_template_aborts() {
    let empty = TemplateRegistry::new();
    let _ = GoServerGenerator::new().generate(&app(SIMPLE_SEARCH, &GenOpts::default()), &empty);
}
