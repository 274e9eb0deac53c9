use super::harness::{FakeServer, Route, TestContext, ensure_dir, parse_json};

pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&TestContext) -> Result<(), String>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "help_output",
            run: scenario_help,
        },
        Scenario {
            name: "conflicting_formats",
            run: scenario_conflicting_formats,
        },
        Scenario {
            name: "no_site_packages",
            run: scenario_no_site_packages,
        },
        Scenario {
            name: "no_funding_links",
            run: scenario_no_funding_links,
        },
        Scenario {
            name: "shared_funding_url",
            run: scenario_shared_funding_url,
        },
        Scenario {
            name: "json_output",
            run: scenario_json_output,
        },
        Scenario {
            name: "json_output_empty",
            run: scenario_json_output_empty,
        },
        Scenario {
            name: "markdown_output",
            run: scenario_markdown_output,
        },
        Scenario {
            name: "named_packages_only",
            run: scenario_named_packages_only,
        },
        Scenario {
            name: "named_package_not_installed",
            run: scenario_named_package_not_installed,
        },
        Scenario {
            name: "unreadable_metadata_skipped",
            run: scenario_unreadable_metadata,
        },
        Scenario {
            name: "generic_link",
            run: scenario_generic_link,
        },
        Scenario {
            name: "extra_aliases_from_config",
            run: scenario_extra_aliases,
        },
        Scenario {
            name: "invalid_config_uses_defaults",
            run: scenario_invalid_config,
        },
        Scenario {
            name: "remote_not_found_continues",
            run: scenario_remote_not_found,
        },
        Scenario {
            name: "remote_server_error_skipped",
            run: scenario_remote_server_error,
        },
        Scenario {
            name: "remote_large_response",
            run: scenario_remote_large_response,
        },
        Scenario {
            name: "github_without_token",
            run: scenario_github_without_token,
        },
        Scenario {
            name: "github_funding_yml",
            run: scenario_github_funding_yml,
        },
        Scenario {
            name: "github_unauthorized_continues",
            run: scenario_github_unauthorized,
        },
    ]
}

fn scenario_help(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("help")?;
    let output = ctx.run_pip_fund(&env, &["--help"])?;
    output.assert_success()?;
    output.assert_stdout_contains("--remote")?;
    output.assert_stdout_contains("--markdown")?;
    Ok(())
}

fn scenario_conflicting_formats(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("conflict")?;
    let site = env.site_arg();
    let output = ctx.run_pip_fund(&env, &["--json", "--markdown", "--path", &site])?;
    output.assert_failure()?;
    output.assert_stderr_contains("cannot be used with")?;
    if !output.stdout.is_empty() {
        return Err(format!("Expected no report, got: {}", output.stdout));
    }
    Ok(())
}

fn scenario_no_site_packages(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("no-site")?;
    let missing = env.root.join("does-not-exist").display().to_string();
    let output = ctx.run_pip_fund(&env, &["--path", &missing])?;
    output.assert_success()?;
    output.assert_stdout_contains("No packages could be scanned.")?;
    Ok(())
}

fn scenario_no_funding_links(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("no-funding")?;
    env.install("requests", &["Project-URL: Documentation, https://requests.readthedocs.io"])?;
    let output = ctx.run_pip_fund(&env, &["--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("No funding links found for any packages.")?;
    Ok(())
}

fn scenario_shared_funding_url(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("shared")?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate?x=1"])?;
    env.install("scipy", &["Project-URL: Sponsor, https://numfocus.org/donate"])?;

    let output = ctx.run_pip_fund(&env, &["--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("--- Funding Information Found ---")?;
    output.assert_stdout_contains("Funding: https://numfocus.org/donate\n")?;
    output.assert_stdout_contains("  Packages: numpy, scipy")?;
    output.assert_stdout_not_contains("x=1")?;
    let count = output.stdout.matches("numfocus.org/donate").count();
    if count != 1 {
        return Err(format!("Expected one numfocus entry, found {}", count));
    }
    Ok(())
}

fn scenario_json_output(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("json")?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate?x=1"])?;
    env.install("scipy", &["Project-URL: Sponsor, https://numfocus.org/donate"])?;
    env.install("attrs", &["Project-URL: Funding, https://tidelift.com/attrs#sub"])?;

    let output = ctx.run_pip_fund(&env, &["--json", "--path", &env.site_arg()])?;
    output.assert_success()?;
    let value = parse_json(&output.stdout)?;

    if value["scanned"] != 3 {
        return Err(format!("Expected scanned = 3, got {}", value["scanned"]));
    }
    let funding = value["funding"]
        .as_array()
        .ok_or_else(|| "Expected funding array".to_string())?;
    if funding.len() != 2 {
        return Err(format!("Expected 2 funding entries, got {}", funding.len()));
    }
    let numfocus = funding
        .iter()
        .find(|e| e["url"] == "https://numfocus.org/donate")
        .ok_or_else(|| "Missing numfocus entry".to_string())?;
    if numfocus["packages"] != serde_json::json!(["numpy", "scipy"]) {
        return Err(format!("Unexpected packages: {}", numfocus["packages"]));
    }
    if value.get("message").is_some() {
        return Err("Did not expect a message when links were found".to_string());
    }
    Ok(())
}

fn scenario_json_output_empty(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("json-empty")?;
    env.install("requests", &[])?;
    let output = ctx.run_pip_fund(&env, &["--json", "--path", &env.site_arg()])?;
    output.assert_success()?;
    let value = parse_json(&output.stdout)?;
    if value["message"] != "No funding links found for any packages." {
        return Err(format!("Unexpected message: {}", value["message"]));
    }
    Ok(())
}

fn scenario_markdown_output(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("markdown")?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate"])?;
    let output = ctx.run_pip_fund(&env, &["--markdown", "--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("# Funding Information")?;
    output.assert_stdout_contains("* **Funding**: https://numfocus.org/donate")?;
    output.assert_stdout_contains("  - Packages: numpy")?;
    Ok(())
}

fn scenario_named_packages_only(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("named")?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate"])?;
    env.install(
        "attrs",
        &[
            "Project-URL: Funding, https://tidelift.com/attrs",
            "Project-URL: Tidelift, https://tidelift.com/subscription/pkg/pypi-attrs",
        ],
    )?;

    let output = ctx.run_pip_fund(&env, &["attrs", "--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("Funding: https://tidelift.com/attrs\n")?;
    output.assert_stdout_not_contains("numfocus")?;
    // "Tidelift" is not a funding label
    output.assert_stdout_not_contains("subscription")?;
    Ok(())
}

fn scenario_named_package_not_installed(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("named-missing")?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate"])?;

    let output = ctx.run_pip_fund(&env, &["ghost", "numpy", "--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("Packages: numpy")?;
    output.assert_stdout_contains("ghost: not installed")?;
    output.assert_stderr_contains("ghost is not installed")?;
    Ok(())
}

fn scenario_unreadable_metadata(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("unreadable")?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate"])?;
    ensure_dir(&env.site.join("broken-2.0.dist-info"))?;

    let output = ctx.run_pip_fund(&env, &["--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("Packages: numpy")?;
    output.assert_stdout_contains("Skipped 1 package(s):")?;
    output.assert_stderr_contains("Skipping broken")?;
    Ok(())
}

fn scenario_generic_link(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("generic")?;
    env.install("pkg", &["Project-URL: https://github.com/sponsors/pkg-author"])?;
    let output = ctx.run_pip_fund(&env, &["--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("Generic Link: https://github.com/sponsors/pkg-author")?;
    Ok(())
}

fn scenario_extra_aliases(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("aliases")?;
    env.install("pkg", &["Project-URL: Support, https://pkg.example/support"])?;

    let before = ctx.run_pip_fund(&env, &["--path", &env.site_arg()])?;
    before.assert_success()?;
    before.assert_stdout_contains("No funding links found")?;

    env.write_config(r#"{"extra_aliases": ["Support"]}"#)?;
    let after = ctx.run_pip_fund(&env, &["--path", &env.site_arg()])?;
    after.assert_success()?;
    after.assert_stdout_contains("Support: https://pkg.example/support")?;
    Ok(())
}

fn scenario_invalid_config(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("invalid-config")?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate"])?;
    env.write_config("{ this is not json")?;

    let output = ctx.run_pip_fund(&env, &["--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stderr_contains("Failed to parse config file")?;
    output.assert_stdout_contains("Packages: numpy")?;
    Ok(())
}

fn scenario_remote_not_found(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("remote")?;
    let server = FakeServer::start(vec![Route::ok(
        "/pypi/flask/json",
        r#"{"info": {"name": "Flask", "project_urls": {"Donate": "https://palletsprojects.com/donate", "Source": "https://github.com/pallets/flask/"}}}"#,
    )])?;
    env.write_config(&format!(r#"{{"pypi_url": "{}"}}"#, server.base_url))?;

    let output = ctx.run_pip_fund(
        &env,
        &[
            "no-such-package",
            "flask",
            "--remote",
            "--json",
            "--path",
            &env.site_arg(),
        ],
    )?;
    output.assert_success()?;
    let value = parse_json(&output.stdout)?;

    if value["funding"][0]["url"] != "https://palletsprojects.com/donate" {
        return Err(format!("Unexpected funding: {}", value["funding"]));
    }
    if value["funding"][0]["packages"] != serde_json::json!(["flask"]) {
        return Err(format!("Unexpected packages: {}", value["funding"][0]["packages"]));
    }
    if value["skipped"][0]["package"] != "no-such-package" {
        return Err(format!("Unexpected skipped: {}", value["skipped"]));
    }
    let reason = value["skipped"][0]["reason"].as_str().unwrap_or_default();
    if !reason.contains("not found") {
        return Err(format!("Expected a not-found reason, got '{}'", reason));
    }
    Ok(())
}

fn scenario_remote_server_error(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("remote-500")?;
    let server = FakeServer::start(vec![Route::with_status(
        "/pypi/flask/json",
        500,
        r#"{"message": "Internal Server Error"}"#,
    )])?;
    env.write_config(&format!(r#"{{"pypi_url": "{}"}}"#, server.base_url))?;

    let output = ctx.run_pip_fund(
        &env,
        &["flask", "--remote", "--json", "--path", &env.site_arg()],
    )?;
    output.assert_success()?;
    let value = parse_json(&output.stdout)?;

    if value["scanned"] != 0 {
        return Err(format!("Expected scanned = 0, got {}", value["scanned"]));
    }
    if value["skipped"][0]["package"] != "flask" {
        return Err(format!("Unexpected skipped: {}", value["skipped"]));
    }
    let reason = value["skipped"][0]["reason"].as_str().unwrap_or_default();
    if !reason.contains("Network error") {
        return Err(format!("Expected a network error reason, got '{}'", reason));
    }
    Ok(())
}

fn scenario_remote_large_response(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("remote-large")?;
    let body = format!(
        r#"{{"info": {{"name": "big", "project_urls": {{"Funding": "https://big.example/fund"}}}}, "releases": {{"padding": "{}"}}}}"#,
        "x".repeat(11 * 1024 * 1024)
    );
    let server = FakeServer::start(vec![Route::ok("/pypi/big/json", &body)])?;
    env.write_config(&format!(r#"{{"pypi_url": "{}"}}"#, server.base_url))?;

    let output = ctx.run_pip_fund(&env, &["big", "--remote", "--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stdout_contains("Funding: https://big.example/fund")?;
    output.assert_stdout_not_contains("Skipped")?;
    Ok(())
}

fn scenario_github_without_token(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("github-no-token")?;
    env.install("attrs", &["Project-URL: Source, https://github.com/python-attrs/attrs"])?;

    let output = ctx.run_pip_fund(&env, &["--github", "--path", &env.site_arg()])?;
    output.assert_success()?;
    output.assert_stderr_contains("GITHUB_TOKEN is not set")?;
    output.assert_stdout_contains("No funding links found")?;
    Ok(())
}

fn scenario_github_funding_yml(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("github")?;
    let server = FakeServer::start(vec![Route::ok(
        "/repos/python-attrs/attrs/contents/.github/FUNDING.yml",
        "github: hynek\ntidelift: pypi/attrs\n",
    )])?;
    env.write_config(&format!(r#"{{"github_api_url": "{}"}}"#, server.base_url))?;
    env.install("attrs", &["Project-URL: Source, https://github.com/python-attrs/attrs"])?;
    env.install("nofile", &["Project-URL: Source, https://github.com/someone/nofile"])?;

    let output = ctx.run_pip_fund_with_env(
        &env,
        &["--github", "--path", &env.site_arg()],
        &[("GITHUB_TOKEN", "test-token")],
    )?;
    output.assert_success()?;
    output.assert_stdout_contains("GitHub Sponsors: https://github.com/sponsors/hynek")?;
    output.assert_stdout_contains("Tidelift: https://tidelift.com/funding/github/pypi/attrs")?;
    output.assert_stdout_not_contains("nofile")?;
    Ok(())
}

fn scenario_github_unauthorized(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("github-401")?;
    let server = FakeServer::start(vec![Route::with_status(
        "/repos/python-attrs/attrs/contents/.github/FUNDING.yml",
        401,
        r#"{"message": "Bad credentials"}"#,
    )])?;
    env.write_config(&format!(r#"{{"github_api_url": "{}"}}"#, server.base_url))?;
    env.install("attrs", &["Project-URL: Source, https://github.com/python-attrs/attrs"])?;
    env.install("numpy", &["Project-URL: Funding, https://numfocus.org/donate"])?;

    let output = ctx.run_pip_fund_with_env(
        &env,
        &["--github", "--path", &env.site_arg()],
        &[("GITHUB_TOKEN", "expired-token")],
    )?;
    output.assert_success()?;
    output.assert_stdout_contains("Packages: numpy")?;
    output.assert_stdout_not_contains("attrs")?;
    output.assert_stdout_not_contains("Skipped")?;
    Ok(())
}
