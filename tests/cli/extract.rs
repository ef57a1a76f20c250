use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const HEADER: &str = concat!(
    "msgid \"\"\n",
    "msgstr \"\"\n",
    "\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
    "\"Content-Transfer-Encoding: 8bit\\n\"\n",
    "\"Language: en\\n\"\n",
    "\n",
);

fn project() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file(
        "templates/index.twig",
        concat!(
            "<h1>{% trans %}My Title{% endtrans %}</h1>\n",
            "<p>{{ 'Welcome %name%' | trans({'%name%': user}) }}</p>\n",
            "<p>{% trans count n %}One apple|%count% apples{% endtrans %}</p>\n",
            "<p>{% trans %}Open{% context %}menu{% endtrans %}</p>\n",
            "<p>{{ 'Oops' | trans({}, 'errors') }}</p>\n",
        ),
    )?;
    test.write_file(
        "src/app.ts",
        "export const greet = (user: string) => i18n.translate(\"Welcome %name%\", { \"%name%\": user });\n",
    )?;
    Ok(test)
}

#[test]
fn test_extract_writes_one_pot_per_domain() -> Result<()> {
    let test = project()?;

    let output = test.extract(&["."])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let messages = test.read_file("languages/messages.pot")?;
    let expected = format!(
        "{}{}",
        HEADER,
        concat!(
            "#: ./templates/index.twig:1\n",
            "msgid \"My Title\"\n",
            "msgstr \"\"\n",
            "\n",
            "#: ./templates/index.twig:2 ./src/app.ts:1\n",
            "msgid \"Welcome %name%\"\n",
            "msgstr \"\"\n",
            "\n",
            "#: ./templates/index.twig:3\n",
            "msgid \"One apple\"\n",
            "msgid_plural \"%count% apples\"\n",
            "msgstr[0] \"\"\n",
            "msgstr[1] \"\"\n",
            "\n",
            "#: ./templates/index.twig:4\n",
            "msgctxt \"menu\"\n",
            "msgid \"Open\"\n",
            "msgstr \"\"\n",
        )
    );
    assert_eq!(messages, expected);

    let errors = test.read_file("languages/errors.pot")?;
    assert_eq!(
        errors,
        format!(
            "{}#: ./templates/index.twig:5\nmsgid \"Oops\"\nmsgstr \"\"\n",
            HEADER
        )
    );

    let out = stdout(&output);
    assert!(
        out.starts_with("✓ Extracted 5 messages from 2 files\n"),
        "stdout: {}",
        out
    );

    Ok(())
}

#[test]
fn test_extract_overrides() -> Result<()> {
    let test = project()?;

    let output = test.extract(&[
        "templates",
        "--output",
        "out",
        "--domain",
        "site",
        "--locale",
        "fr",
    ])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert!(!test.root().join("languages").exists());
    let site = test.read_file("out/site.pot")?;
    assert!(site.contains("\"Language: fr\\n\""));
    assert!(site.contains("#: templates/index.twig:1\nmsgid \"My Title\"\n"));
    assert!(test.root().join("out/errors.pot").exists());

    Ok(())
}

#[test]
fn test_extract_uses_config_file() -> Result<()> {
    let test = project()?;
    test.write_file(
        ".transcatrc.json",
        r#"{ "outputDir": "./i18n", "ignores": ["src"] }"#,
    )?;

    let output = test.extract(&["."])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let messages = test.read_file("i18n/messages.pot")?;
    assert!(messages.contains("#: ./templates/index.twig:2\nmsgid \"Welcome %name%\"\n"));

    Ok(())
}

#[test]
fn test_broken_file_in_directory_is_skipped() -> Result<()> {
    let test = project()?;
    test.write_file("templates/broken.twig", "{% trans %}unterminated")?;

    let output = test.extract(&["templates"])?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output).trim_end(),
        "warning: 1 file(s) could not be extracted (use -v for details)"
    );
    assert!(test.read_file("languages/messages.pot")?.contains("My Title"));

    Ok(())
}

#[test]
fn test_broken_single_file_is_an_error() -> Result<()> {
    let test = project()?;
    test.write_file("templates/broken.twig", "{% trans %}unterminated")?;

    let output = test.extract(&["templates/broken.twig"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error: Unable to parse template templates/broken.twig"));
    assert!(!test.root().join("languages").exists());

    Ok(())
}

#[test]
fn test_missing_resource() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract(&["nowhere"])?;
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr(&output).trim_end(), "Error: nowhere does not exist");

    Ok(())
}
