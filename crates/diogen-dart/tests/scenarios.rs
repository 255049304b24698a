use diogen_core::config::{FeatureConfig, RunConfig};
use diogen_core::error::Phase;
use diogen_core::{CodeGenerator, GenerateError, GeneratedFile, RenderError, orchestrator, parse};
use diogen_dart::{DartDioGenerator, TemplateSet};
use indexmap::IndexMap;

const PETSTORE: &str = include_str!("../../diogen-core/tests/fixtures/petstore.yaml");
const INLINE: &str = include_str!("../../diogen-core/tests/fixtures/inline-deserialize.yaml");
const ONEOF: &str = include_str!("../../diogen-core/tests/fixtures/oneof-discriminator.yaml");
const CYCLIC: &str = include_str!("../../diogen-core/tests/fixtures/cyclic.yaml");
const SECURITY: &str = include_str!("../../diogen-core/tests/fixtures/security.yaml");

const SINGLE_PET: &str = r##"
openapi: 3.0.3
info: { title: Single, version: "1" }
paths:
  /pet:
    get:
      operationId: getPet
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Pet" }
components:
  schemas:
    Pet:
      type: object
      properties:
        id: { type: integer, format: int64 }
        name: { type: string }
    Tags:
      type: array
      items: { type: string }
"##;

fn run_config(options: &[(&str, &str)]) -> RunConfig {
    let options: IndexMap<String, String> = options
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut config = RunConfig::with_features(FeatureConfig::from_options(&options));
    config.package_name = "my-package".to_string();
    config.pubspec.git_user_id = Some("my-user".to_string());
    config.pubspec.git_repo_id = Some("my-repo".to_string());
    config
}

fn generate_with(
    yaml: &str,
    config: &RunConfig,
    generator: &dyn CodeGenerator,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let spec = parse::from_yaml(yaml).expect("fixture should parse");
    orchestrator::generate(&spec, config, generator)
}

fn generate(yaml: &str, options: &[(&str, &str)]) -> Vec<GeneratedFile> {
    generate_with(yaml, &run_config(options), &DartDioGenerator::new()).unwrap()
}

fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == path)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| {
            let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
            panic!("missing {path}; have {paths:?}")
        })
}

fn has_file(files: &[GeneratedFile], path: &str) -> bool {
    files.iter().any(|f| f.path == path)
}

const FREEZED: (&str, &str) = ("serializationLibrary", "freezed");
const RESULT_DART: (&str, &str) = ("useResultDart", "true");

#[test]
fn output_tree() {
    let files = generate(PETSTORE, &[]);
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    insta::assert_snapshot!(paths.join("\n"), @r"
pubspec.yaml
analysis_options.yaml
.gitignore
README.md
lib/my_package.dart
lib/src/api.dart
lib/src/model/order.dart
lib/src/model/category.dart
lib/src/model/tag.dart
lib/src/model/pet.dart
lib/src/model/order_status.dart
lib/src/model/pet_status.dart
lib/src/model/find_pets_by_status_status_parameter_item.dart
lib/src/api/default_api.dart
lib/src/api/pet_api.dart
lib/src/api/store_api.dart
");
}

#[test]
fn every_file_starts_with_the_generated_banner() {
    for files in [generate(PETSTORE, &[]), generate(ONEOF, &[FREEZED, RESULT_DART])] {
        for f in &files {
            let first = f.content.lines().next().unwrap_or_default();
            assert!(first.contains("AUTO-GENERATED"), "{}: {first}", f.path);
            assert!(!f.content.contains("Generated at"), "{}", f.path);
        }
    }
}

#[test]
fn timestamp_only_when_not_hidden() {
    let mut config = run_config(&[("hideGenerationTimestamp", "false")]);
    config.generated_at = Some("2024-01-01T00:00:00Z".to_string());
    let files = generate_with(PETSTORE, &config, &DartDioGenerator::new()).unwrap();
    assert!(file(&files, "lib/src/model/pet.dart").contains("// Generated at 2024-01-01T00:00:00Z."));
    assert!(file(&files, "pubspec.yaml").contains("# Generated at 2024-01-01T00:00:00Z."));

    let mut hidden = run_config(&[]);
    hidden.generated_at = Some("2024-01-01T00:00:00Z".to_string());
    let files = generate_with(PETSTORE, &hidden, &DartDioGenerator::new()).unwrap();
    assert!(!file(&files, "lib/src/model/pet.dart").contains("Generated at"));
}

#[test]
fn single_object_round_trip() {
    let files = generate(SINGLE_PET, &[]);
    let pet = file(&files, "lib/src/model/pet.dart");
    assert!(pet.contains("class Pet {"));
    assert!(pet.contains("final int? id;"));
    assert!(pet.contains("final String? name;"));
    assert!(pet.contains("factory Pet.fromJson(Map<String, dynamic> json)"));
    assert!(pet.contains("id: json[r'id'] == null ? null : (json[r'id'] as num).toInt(),"));
    assert!(pet.contains("if (name != null) r'name': name,"));

    let api = file(&files, "lib/src/api/default_api.dart");
    assert!(api.contains("class DefaultApi {"));
    assert!(api.contains("Future<Response<Pet>> getPet({"));
    assert!(api.contains("import '../model/pet.dart';"));
    assert!(api.contains(
        "_responseData = rawData == null ? null : Pet.fromJson(rawData as Map<String, dynamic>);"
    ));

    let tags = file(&files, "lib/src/model/tags.dart");
    assert!(tags.contains("typedef Tags = List<String>;"));
}

#[test]
fn container_responses_decode_through_element_decoder() {
    for options in [&[][..], &[FREEZED][..]] {
        let files = generate(INLINE, options);
        let api = file(&files, "lib/src/api/inline_api.dart");
        assert!(api.contains("map((dynamic value)"), "{api}");
        assert!(api.contains("Pet.fromJson("));
        assert!(api.contains("MapEntry"));
        assert!(api.contains("Status.fromJson"));
        assert!(api.contains(
            "(rawData as List<dynamic>).map((dynamic value) => Status.fromJson(value)).toList()"
        ));
        assert!(api.contains(
            "(rawData as Map<String, dynamic>).map((String key, dynamic value) => MapEntry(key, Status.fromJson(value)))"
        ));
        assert!(api.contains("GetInlineStatus200Response.fromJson(rawData)"));
        // Enum values stay in the enum's own file.
        assert!(!api.contains("available"));
    }
}

#[test]
fn enum_rejects_unknown_values() {
    let files = generate(INLINE, &[]);
    let status = file(&files, "lib/src/model/status.dart");
    assert!(status.contains("enum Status {"));
    assert!(status.contains("  available(r'available'),"));
    assert!(status.contains("  sold(r'sold');"));
    assert!(status.contains("throw FormatException('Unknown Status value', json);"));

    let files = generate(INLINE, &[FREEZED]);
    let status = file(&files, "lib/src/model/status.dart");
    assert!(status.contains("@JsonValue(r'pending')"));
}

#[test]
fn freezed_object_model() {
    let files = generate(PETSTORE, &[FREEZED]);
    let pet = file(&files, "lib/src/model/pet.dart");
    assert!(pet.contains("@freezed"));
    assert!(pet.contains("part 'pet.freezed.dart';"));
    assert!(pet.contains("part 'pet.g.dart';"));
    assert!(pet.contains("@JsonKey(name: r'name') required String name,"));
    assert!(pet.contains("@JsonKey(name: r'status') PetStatus? status,"));
    assert!(pet.contains("import 'pet_status.dart';"));
}

#[test]
fn freezed_union_with_discriminator_mapping() {
    let files = generate(ONEOF, &[FREEZED]);
    let union = file(&files, "lib/src/model/foo_ref_or_value.dart");
    assert!(union.contains("@Freezed(unionKey: r'@type')"));
    assert!(union.contains("@FreezedUnionValue(r'Foo')"));
    assert!(union.contains("const factory FooRefOrValue.foo"));
    assert!(union.contains("part 'foo_ref_or_value.g.dart';"));
    assert!(union.contains("= FooRefOrValueFoo;"));
    assert!(union.contains("throw CheckedFromJsonException("));
    assert!(union.contains("static const Set<String> _tags = <String>{\n    r'Foo',\n  };"));
    // The library writes the tag; it is not a factory parameter.
    assert!(!union.contains("atType"));
    assert!(union.contains("@JsonKey(name: r'fooPropA') String? fooPropA,"));
}

#[test]
fn plain_union_dispatches_on_discriminator() {
    let files = generate(ONEOF, &[]);
    let union = file(&files, "lib/src/model/foo_ref_or_value.dart");
    assert!(union.contains("sealed class FooRefOrValue {"));
    assert!(union.contains("final tag = json[r'@type'];"));
    assert!(union.contains("case r'Foo':\n        return FooRefOrValueFoo(Foo.fromJson(json));"));
    assert!(union.contains("throw FormatException('Unknown FooRefOrValue discriminator value', tag);"));
    assert!(union.contains("final class FooRefOrValueFoo extends FooRefOrValue {"));
    assert!(union.contains("import 'foo.dart';"));
    assert!(!union.contains("@Freezed"));

    let animal = file(&files, "lib/src/model/animal.dart");
    for tag in ["r'Cat'", "r'Dog'", "r'AnimalVariant3'"] {
        assert!(animal.contains(&format!("case {tag}:")), "{tag}");
    }

    let foo = file(&files, "lib/src/model/foo.dart");
    assert!(foo.contains("required this.atType,"));
    assert!(foo.contains("atType: json[r'@type'] as String,"));
    assert!(foo.contains("r'@type': atType,"));
}

#[test]
fn result_representation_changes_only_operations() {
    let throwing = generate(PETSTORE, &[]);
    let tagged = generate(PETSTORE, &[RESULT_DART]);

    let throwing_api = file(&throwing, "lib/src/api/pet_api.dart");
    let tagged_api = file(&tagged, "lib/src/api/pet_api.dart");
    assert!(throwing_api.contains("Future<Response<Pet>> getPetById({"));
    assert!(!throwing_api.contains("result_dart"));
    assert!(tagged_api.contains("Future<Result<Response<Pet>>> getPetById({"));
    assert!(tagged_api.contains("Result<Response<"));
    assert!(tagged_api.contains("package:result_dart/result_dart.dart"));
    assert!(tagged_api.contains("return Success(_typedResponse);"));
    assert!(tagged_api.contains("return Failure(error);"));

    let decode = "_responseData = rawData == null ? null : Pet.fromJson(rawData as Map<String, dynamic>);";
    assert!(throwing_api.contains(decode));
    assert!(tagged_api.contains(decode));

    for f in throwing.iter().filter(|f| f.path.starts_with("lib/src/model/")) {
        assert_eq!(f.content, file(&tagged, &f.path), "{}", f.path);
    }
}

#[test]
fn operation_requests() {
    let files = generate(PETSTORE, &[]);
    let api = file(&files, "lib/src/api/pet_api.dart");
    assert!(api.contains("final _path = r'/pet/' + Uri.encodeComponent(petId.toString());"));
    assert!(api.contains("if (apiKey != null) r'api_key': apiKey,"));
    assert!(api.contains("required Pet body,"));
    assert!(api.contains("final _bodyData = body.toJson();"));
    assert!(api.contains("contentType: r'application/json',"));
    assert!(api.contains(
        "r'status': status.map((value) => value.toJson()).toList(),"
    ));
    assert!(api.contains("Future<Response<void>> deletePet({"));

    let store = file(&files, "lib/src/api/store_api.dart");
    assert!(store.contains("Future<Response<Map<String, int>>> getInventory({"));
}

#[test]
fn pubspec_follows_features() {
    let plain = generate(PETSTORE, &[]);
    let pubspec: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(file(&plain, "pubspec.yaml")).unwrap();
    assert_eq!(pubspec["name"].as_str(), Some("my_package"));
    assert_eq!(
        pubspec["homepage"].as_str(),
        Some("https://github.com/my-user/my-repo")
    );
    assert_eq!(pubspec["description"].as_str(), Some("A sample pet store"));
    assert!(pubspec["dependencies"].get("dio").is_some());
    assert!(pubspec["dependencies"].get("freezed_annotation").is_none());
    assert!(pubspec["dependencies"].get("result_dart").is_none());
    assert!(!has_file(&plain, "build.yaml"));

    let tagged = generate(PETSTORE, &[FREEZED, RESULT_DART]);
    let text = file(&tagged, "pubspec.yaml");
    let pubspec: serde_yaml_ng::Value = serde_yaml_ng::from_str(text).unwrap();
    assert!(pubspec["dependencies"].get("freezed_annotation").is_some());
    assert!(pubspec["dependencies"].get("result_dart").is_some());
    assert!(pubspec["dev_dependencies"].get("build_runner").is_some());
    assert!(!text.contains("copy_with_extension"));
    assert!(!text.contains("equatable"));
    assert!(file(&tagged, "build.yaml").contains("explicit_to_json: true"));
}

#[test]
fn library_and_client_files() {
    let files = generate(PETSTORE, &[]);
    assert!(has_file(&files, "README.md"));
    let client = file(&files, "lib/src/api.dart");
    assert!(client.contains("class MyPackage {"));
    assert!(client.contains("static const String basePath = r'http://petstore.example.com/v2';"));
    assert!(client.contains("PetApi getPetApi() => PetApi(dio);"));

    let library = file(&files, "lib/my_package.dart");
    assert!(library.contains("export 'src/api/pet_api.dart';"));
    assert!(library.contains("export 'src/model/pet_status.dart';"));
}

#[test]
fn recursive_models_render() {
    let files = generate(CYCLIC, &[]);
    let node = file(&files, "lib/src/model/node.dart");
    assert!(node.contains("final Node? parent;"));
    assert!(node.contains(
        "parent: json[r'parent'] == null ? null : Node.fromJson(json[r'parent'] as Map<String, dynamic>),"
    ));
    assert!(node.contains("import 'node_meta.dart';"));
    assert!(!node.contains("import 'node.dart';"));

    let meta = file(&files, "lib/src/model/node_meta.dart");
    assert!(meta.contains("final Map<String, NodeMetaLabelsValue>? labels;"));
}

#[test]
fn rendering_is_deterministic() {
    for options in [&[][..], &[FREEZED, RESULT_DART][..]] {
        for fixture in [PETSTORE, ONEOF, INLINE, CYCLIC, SECURITY] {
            assert_eq!(generate(fixture, options), generate(fixture, options));
        }
    }
}

#[test]
fn missing_variant_template_fails_the_run() {
    let generator =
        DartDioGenerator::with_templates(TemplateSet::dart().without("union_freezed.dart.j2"));
    let err = generate_with(ONEOF, &run_config(&[FREEZED]), &generator).unwrap_err();
    assert_eq!(err.phase(), Phase::Rendering);
    match err {
        GenerateError::Rendering(RenderError::VariantMissing { subject, variant }) => {
            assert_eq!(subject, "FooRefOrValue");
            assert_eq!(variant, "union_freezed.dart.j2");
        }
        other => panic!("expected a missing variant, got {other}"),
    }

    // The plain strategy never asks for the removed template.
    assert!(generate_with(ONEOF, &run_config(&[]), &generator).is_ok());
}

#[test]
fn missing_operation_template_fails_the_run() {
    let generator =
        DartDioGenerator::with_templates(TemplateSet::dart().without("operation_result.dart.j2"));
    let err = generate_with(PETSTORE, &run_config(&[RESULT_DART]), &generator).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Rendering(RenderError::VariantMissing { ref variant, .. })
            if variant == "operation_result.dart.j2"
    ));
}

#[test]
fn multi_line_title_stays_inside_the_banner() {
    let yaml = SINGLE_PET.replace("title: Single", "title: \"Pet\\nStore\"");
    let mut config = run_config(&[("hideGenerationTimestamp", "false")]);
    config.generated_at = Some("2024-01-01\n00:00".to_string());
    let files = generate_with(&yaml, &config, &DartDioGenerator::new()).unwrap();

    let pet = file(&files, "lib/src/model/pet.dart");
    let banner: Vec<&str> = pet.lines().take_while(|l| !l.is_empty()).collect();
    assert_eq!(banner.len(), 3, "{banner:?}");
    assert!(banner.iter().all(|l| l.starts_with("// ")), "{banner:?}");
    assert!(banner[1].ends_with("from Pet Store 1."), "{}", banner[1]);
    assert_eq!(banner[2], "// Generated at 2024-01-01 00:00.");

    let pubspec = file(&files, "pubspec.yaml");
    assert!(pubspec.lines().take(2).all(|l| l.starts_with("# ")));
    let readme = file(&files, "README.md");
    assert!(readme.lines().next().unwrap().ends_with("-->"));
}

#[test]
fn boolean_and_integer_enums_keep_their_wire_type() {
    let files = generate(SECURITY, &[]);
    let sealed = file(&files, "lib/src/model/secret_sealed.dart");
    assert!(sealed.contains("enum SecretSealed {"));
    assert!(sealed.contains("  true_(true),"));
    assert!(sealed.contains("  false_(false);"));
    assert!(sealed.contains("final bool value;"));
    assert!(sealed.contains("bool toJson() => value;"));

    let level = file(&files, "lib/src/model/secret_level.dart");
    assert!(level.contains("  number_1(1),"));
    assert!(level.contains("final int value;"));
    assert!(!level.contains("r'1'"));

    let tagged = generate(SECURITY, &[FREEZED]);
    assert!(file(&tagged, "lib/src/model/secret_sealed.dart").contains("final bool value;"));
}

#[test]
fn nullable_list_items_decode_null() {
    let files = generate(SECURITY, &[]);
    let secret = file(&files, "lib/src/model/secret.dart");
    assert!(secret.contains("final List<String?>? labels;"));
    assert!(secret.contains(
        "(json[r'labels'] as List<dynamic>).map((dynamic value) => value == null ? null : value as String).toList()"
    ));
}

#[test]
fn security_schemes_generate_auth_interceptors() {
    let files = generate(SECURITY, &[]);
    for path in [
        "lib/src/auth/auth.dart",
        "lib/src/auth/api_key_auth.dart",
        "lib/src/auth/basic_auth.dart",
        "lib/src/auth/bearer_auth.dart",
    ] {
        assert!(file(&files, path).starts_with("// AUTO-GENERATED"), "{path}");
    }
    assert!(file(&files, "lib/src/auth/basic_auth.dart").contains("base64Encode"));

    let client = file(&files, "lib/src/api.dart");
    assert!(client.contains("import 'auth/bearer_auth.dart';"));
    assert!(client.contains("List<Interceptor>? interceptors"));
    assert!(client.contains("          ApiKeyAuthInterceptor(),"));
    assert!(client.contains("void setApiKey(String name, String apiKey) {"));
    assert!(client.contains("void setBasicAuth(String name, String username, String password) {"));
    assert!(client.contains("interceptor.tokens[name] = token;"));

    let library = file(&files, "lib/my_package.dart");
    assert!(library.contains("export 'src/auth/api_key_auth.dart';"));

    let api = file(&files, "lib/src/api/secrets_api.dart");
    assert!(api.contains("'secure': <Map<String, String>>["));
    assert!(api.contains("r'type': r'bearer',\n            r'name': r'bearerToken',"));
    assert!(api.contains("r'keyName': r'X-Vault-Key',"));
    assert!(api.contains("r'where': r'header',"));
    assert!(api.contains("r'name': r'oauth',"));

    let system = file(&files, "lib/src/api/system_api.dart");
    assert!(!system.contains("'secure'"));

    let plain = generate(PETSTORE, &[]);
    assert!(!plain.iter().any(|f| f.path.starts_with("lib/src/auth/")));
    assert!(!file(&plain, "lib/src/api.dart").contains("Interceptor"));
}

#[test]
fn client_class_does_not_shadow_a_model() {
    let mut config = run_config(&[]);
    config.package_name = "pet".to_string();
    let files = generate_with(PETSTORE, &config, &DartDioGenerator::new()).unwrap();
    assert!(file(&files, "lib/src/model/pet.dart").contains("class Pet {"));
    assert!(file(&files, "lib/src/api.dart").contains("class Pet2 {"));
    assert!(file(&files, "README.md").contains("final client = Pet2();"));
    assert!(has_file(&files, "lib/pet.dart"));
}
