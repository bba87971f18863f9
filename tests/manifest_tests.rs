mod common;

use anyhow::Result;
use common::{PICO_MANIFEST, TestWorkspace};
use picoman::manifest::{
    LinkChange, ManifestError, SubdirectoryPlacement, add_library, read_manifest, remove_library,
    write_manifest,
};
use rstest::rstest;

const PBINSTR: &str = "add_subdirectory(\"/libs/pbinstr\" \"${CMAKE_BINARY_DIR}/pbinstr_build\")";

#[test]
fn test_pico_manifest_add_then_remove() {
    let added = add_library(PICO_MANIFEST, "pbinstr", "/libs/pbinstr", "blink");

    let expected_added = PICO_MANIFEST
        .replace(
            "    blink.c\n)\n",
            &format!("    blink.c\n)\n{PBINSTR}\n"),
        )
        .replace("    hardware_pio\n)", "    hardware_pio\n    pbinstr\n)");
    assert_eq!(added.text, expected_added);
    assert_eq!(added.outcome.subdirectory, SubdirectoryPlacement::AfterExecutable);
    assert_eq!(
        added.outcome.link,
        LinkChange::Appended {
            target: "blink".to_string()
        }
    );

    let removed = remove_library(&added.text, "pbinstr", "blink");
    let expected_removed = PICO_MANIFEST.replace(
        "target_link_libraries(blink\n    pico_stdlib\n    hardware_pio\n)",
        "target_link_libraries(blink pico_stdlib hardware_pio)",
    );
    assert_eq!(removed.text, expected_removed);
    assert_eq!(removed.outcome.subdirectory_lines, 1);
    assert_eq!(removed.outcome.link_entries, 1);
}

#[test]
fn test_generator_style_manifest_with_placeholder_target() {
    let text = "\
project(game C CXX ASM)
add_executable(${PROJECT_NAME} main.c)
target_link_libraries(${PROJECT_NAME} PRIVATE pico_stdlib)
";
    let added = add_library(text, "pbinstr", "/libs/pbinstr", "${PROJECT_NAME}");

    assert!(added.text.contains(&format!("main.c)\n{PBINSTR}\n")));
    assert!(added.text.contains(
        "target_link_libraries(${PROJECT_NAME}\n    PRIVATE\n    pico_stdlib\n    pbinstr\n)\n"
    ));

    let removed = remove_library(&added.text, "pbinstr", "${PROJECT_NAME}");
    assert!(
        removed
            .text
            .contains("target_link_libraries(${PROJECT_NAME} PRIVATE pico_stdlib)\n")
    );
    assert!(!removed.text.contains("add_subdirectory"));
}

#[rstest]
#[case::only_library(
    "target_link_libraries(App pbinstr)\n",
    ""
)]
#[case::keyword_group_emptied(
    "target_link_libraries(App PUBLIC pico_stdlib PRIVATE pbinstr)\n",
    "target_link_libraries(App PUBLIC pico_stdlib)\n"
)]
#[case::generator_expression_kept(
    "target_link_libraries(App\n    $<TARGET_OBJECTS:x>\n    pbinstr\n)\n",
    "target_link_libraries(App $<TARGET_OBJECTS:x>)\n"
)]
#[case::indented_in_if(
    "if(PICO_BOARD)\n  target_link_libraries(App pico_stdlib pbinstr)\nendif()\n",
    "if(PICO_BOARD)\n  target_link_libraries(App pico_stdlib)\nendif()\n"
)]
#[case::quoted_entry(
    "target_link_libraries(App \"pbinstr\" pico_stdlib)\n",
    "target_link_libraries(App pico_stdlib)\n"
)]
fn test_remove_link_entry_forms(#[case] input: &str, #[case] expected: &str) {
    let removed = remove_library(input, "pbinstr", "App");

    assert_eq!(removed.text, expected);
    assert_eq!(removed.outcome.link_entries, 1);
}

#[rstest]
#[case::other_library("target_link_libraries(App pico_stdlib)\n")]
#[case::prefix_only("target_link_libraries(App pbinstr_extra)\nadd_subdirectory(/libs/pbinstr_extra)\n")]
#[case::commented_include("# add_subdirectory(/libs/pbinstr)\n")]
fn test_remove_leaves_unrelated_text(#[case] input: &str) {
    let removed = remove_library(input, "pbinstr", "App");

    assert_eq!(removed.text, input);
    assert!(!removed.changed);
    assert!(!removed.outcome.found());
}

#[test]
fn test_file_round_trip_through_context() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let project = ws.project("blink", PICO_MANIFEST)?;
    let path = ws.ctx.manifest_path(&project);

    let text = read_manifest(&path)?;
    let edited = ws.ctx.editor().add_library(&text, "ws2812", "/libs/ws2812", "blink");
    assert!(edited.changed);
    write_manifest(&path, &edited.text)?;

    assert_eq!(ws.manifest("blink")?, edited.text);
    Ok(())
}

#[test]
fn test_missing_manifest_is_reported() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let path = ws.ctx.project_root.join("ghost/CMakeLists.txt");

    let err = read_manifest(&path).unwrap_err();
    assert!(matches!(err, ManifestError::NotFound(_)));
    assert_eq!(err.error_type(), "Not Found");
    Ok(())
}
