#![deny(missing_docs)]
//! DesignGuard command-line interface.
//!
//! Analyzes a page against a design system and prints or saves the report.

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum};
use designguard_core::{
    Analyzer, DesignGuardError, DesignSystem, FetchOptions, FindingStatus, Report, TargetSource,
    inline_document_url, render_json, render_markdown, sample_design_system, short_target,
    validate_target,
};
use log::{debug, info};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "designguard", version, about = "DesignGuard CLI")]
struct Cli {
    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(&["url", "html"])
))]
struct TargetArgs {
    /// Website URL to analyze.
    #[arg(long)]
    url: Option<String>,
    /// HTML file to analyze instead of a URL.
    #[arg(long)]
    html: Option<PathBuf>,
    /// CSS file applied to the HTML file.
    #[arg(long, requires = "html", conflicts_with = "url")]
    css: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct FetchArgs {
    /// Request timeout in seconds.
    #[arg(long, env = "DESIGNGUARD_TIMEOUT_SECS", default_value_t = 30)]
    timeout: u64,
    /// Proxy prefix; the URL-encoded target is appended to it.
    #[arg(long, env = "DESIGNGUARD_PROXY")]
    proxy: Option<String>,
    /// Fail instead of analyzing the built-in sample page when the target cannot be loaded.
    #[arg(long)]
    no_fallback: bool,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Args, Clone)]
struct AnalyzeArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Design System DNA (JSON) to validate against.
    #[arg(long = "design-system")]
    design_system: PathBuf,
    #[command(flatten)]
    fetch: FetchArgs,
    #[command(flatten)]
    report: OutputArgs,
    /// Exit with status 1 when the report contains errors.
    #[arg(long)]
    fail_on_error: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a website or HTML file against a design system.
    Analyze(AnalyzeArgs),
    /// Check a design system file and summarize its rules.
    Validate {
        /// Design System DNA (JSON) file.
        file: PathBuf,
    },
    /// Print or save the sample design system.
    Sample {
        /// Write the sample to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze(args) => {
            let fail_on_error = args.fail_on_error;
            let report = run_analyze(&args).await?;
            if fail_on_error && report.has_errors() {
                std::process::exit(1);
            }
        }
        Commands::Validate { file } => {
            let summary = run_validate(&file).await?;
            print!("{summary}");
        }
        Commands::Sample { output } => {
            run_sample(output.as_deref()).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

#[cfg(not(test))]
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

async fn run_analyze(args: &AnalyzeArgs) -> CliResult<Report> {
    let target = resolve_target(&args.target).await?;
    let design_system = load_design_system(&args.design_system).await?;
    let options = fetch_options(&args.fetch)?;
    let fallback = !args.fetch.no_fallback;

    let report = tokio::task::spawn_blocking(move || {
        let analyzer = Analyzer::new(TargetSource::new(options));
        let analyzer = if fallback {
            analyzer
        } else {
            analyzer.with_fallback(None)
        };
        analyzer.analyze(&target, &design_system, |progress| {
            info!("analysis progress: {progress}%")
        })
    })
    .await??;

    emit_report(&report, &args.report).await?;
    Ok(report)
}

async fn resolve_target(args: &TargetArgs) -> CliResult<String> {
    if let Some(url) = &args.url {
        if args.css.is_some() {
            return Err("--css only applies to --html targets".into());
        }
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err("url cannot be empty".into());
        }
        validate_target(trimmed)?;
        return Ok(trimmed.to_string());
    }
    if let Some(html_path) = &args.html {
        let html = tokio::fs::read_to_string(html_path).await?;
        let css = match &args.css {
            Some(css_path) => tokio::fs::read_to_string(css_path).await?,
            None => String::new(),
        };
        debug!("analyzing local document {}", html_path.display());
        return Ok(inline_document_url(&html, &css));
    }
    Err("no analysis target provided".into())
}

async fn load_design_system(path: &Path) -> CliResult<DesignSystem> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(DesignSystem::from_json(&contents)?)
}

fn fetch_options(args: &FetchArgs) -> CliResult<FetchOptions> {
    if args.timeout == 0 {
        return Err("timeout must be greater than zero".into());
    }
    Ok(FetchOptions {
        timeout: Duration::from_secs(args.timeout),
        proxy: args.proxy.clone(),
        ..FetchOptions::default()
    })
}

async fn run_validate(path: &Path) -> CliResult<String> {
    let contents = tokio::fs::read_to_string(path).await?;
    match DesignSystem::from_json(&contents) {
        Ok(design_system) => Ok(render_design_system_text(&design_system)),
        Err(DesignGuardError::InvalidDesignSystem(problems)) => {
            for problem in &problems {
                eprintln!("- {problem}");
            }
            Err(format!("{} is not a valid design system", path.display()).into())
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_sample(output: Option<&Path>) -> CliResult<()> {
    let mut contents = render_json(&sample_design_system())?;
    contents.push('\n');
    emit_output(output, contents).await
}

async fn emit_report(report: &Report, output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_report_text(report),
        OutputFormat::Json => {
            let mut json = render_json(report)?;
            json.push('\n');
            json
        }
        OutputFormat::Markdown => render_markdown(report),
    };
    emit_output(output.report_output.as_deref(), contents).await
}

async fn emit_output(path: Option<&Path>, contents: String) -> CliResult<()> {
    if let Some(path) = path {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_report_text(report: &Report) -> String {
    let mut output = String::new();
    let summary = &report.summary;
    let _ = writeln!(output, "Target: {}", short_target(&report.url));
    let _ = writeln!(output, "Generated: {}", report.timestamp);
    let _ = writeln!(
        output,
        "Summary: {} correct, {} warnings, {} errors ({} total)",
        summary.correct, summary.warnings, summary.errors, summary.total
    );

    if report.results.is_empty() {
        let _ = writeln!(output, "Findings: none");
        return output;
    }

    let _ = writeln!(output, "Findings:");
    for finding in &report.results {
        let marker = match finding.status {
            FindingStatus::Correct => "ok",
            FindingStatus::Warning => "warn",
            FindingStatus::Error => "error",
        };
        let _ = writeln!(
            output,
            "- [{marker}] {} {}: {} (actual {}, expected {})",
            finding.rule_id,
            finding.element,
            finding.message,
            finding.actual_value,
            finding.expected_value
        );
    }
    output
}

fn render_design_system_text(design_system: &DesignSystem) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Design system: {} {}",
        design_system.name, design_system.version
    );
    let author = design_system
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.author.as_deref());
    if let Some(author) = author {
        let _ = writeln!(output, "Author: {author}");
    }
    if design_system.rules.is_empty() {
        let _ = writeln!(output, "Rules: none");
        return output;
    }
    let _ = writeln!(output, "Rules ({}):", design_system.rules.len());
    for rule in &design_system.rules {
        let _ = writeln!(
            output,
            "- [{}] {} {} = {}",
            rule.kind,
            rule.id,
            rule.property,
            rule.expected_value.to_display_string()
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{
        AnalyzeArgs, Cli, FetchArgs, OutputArgs, OutputFormat, TargetArgs, emit_report,
        fetch_options, load_design_system, render_design_system_text, render_report_text,
        resolve_target, run_analyze, run_sample, run_validate,
    };
    use clap::Parser;
    use designguard_core::{
        DesignSystem, DocumentSource, FindingStatus, InlineSource, Report, sample_design_system,
    };
    use std::path::PathBuf;
    use std::time::Duration;

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("designguard_cli_test_{nanos}_{counter}"))
    }

    fn temp_dir_with(files: &[(&str, &str)]) -> PathBuf {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create root");
        for (name, contents) in files {
            std::fs::write(root.join(name), contents).expect("write file");
        }
        root
    }

    fn sample_json() -> String {
        serde_json::to_string(&sample_design_system()).expect("sample json")
    }

    fn url_target(url: &str) -> TargetArgs {
        TargetArgs {
            url: Some(url.to_string()),
            html: None,
            css: None,
        }
    }

    fn offline_fetch() -> FetchArgs {
        FetchArgs {
            timeout: 5,
            proxy: None,
            no_fallback: true,
        }
    }

    #[test]
    fn cli_requires_exactly_one_target() {
        let ok = Cli::try_parse_from([
            "designguard",
            "analyze",
            "--url",
            "https://example.com",
            "--design-system",
            "ds.json",
        ]);
        assert!(ok.is_ok());

        let both = Cli::try_parse_from([
            "designguard",
            "analyze",
            "--url",
            "https://example.com",
            "--html",
            "page.html",
            "--design-system",
            "ds.json",
        ]);
        assert!(both.is_err());

        let css_only = Cli::try_parse_from([
            "designguard",
            "analyze",
            "--url",
            "https://example.com",
            "--css",
            "site.css",
            "--design-system",
            "ds.json",
        ]);
        assert!(css_only.is_err());
    }

    #[tokio::test]
    async fn resolve_target_trims_and_validates_urls() {
        let target = resolve_target(&url_target("  https://example.com/page "))
            .await
            .expect("target");
        assert_eq!(target, "https://example.com/page");

        assert!(resolve_target(&url_target("   ")).await.is_err());
        assert!(resolve_target(&url_target("ftp://example.com")).await.is_err());
        assert!(resolve_target(&url_target("not a url")).await.is_err());
    }

    #[tokio::test]
    async fn resolve_target_rejects_css_with_url() {
        let args = TargetArgs {
            css: Some(PathBuf::from("site.css")),
            ..url_target("https://example.com")
        };
        let error = resolve_target(&args).await.expect_err("css with url");
        assert!(error.to_string().contains("--css"));
    }

    #[tokio::test]
    async fn resolve_target_inlines_local_files() {
        let root = temp_dir_with(&[
            ("page.html", "<h1>Title</h1>"),
            ("site.css", ".btn { background-color: #0066FF; }"),
        ]);
        let args = TargetArgs {
            url: None,
            html: Some(root.join("page.html")),
            css: Some(root.join("site.css")),
        };

        let target = resolve_target(&args).await.expect("target");
        assert!(target.starts_with("data:text/html;base64,"));
        let page = InlineSource.fetch(&target).expect("inline page");
        assert!(page.html.contains("<h1>Title</h1>"));
        assert!(page.css.contains("background-color: #0066FF"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn load_design_system_rejects_invalid_files() {
        let root = temp_dir_with(&[
            ("good.json", &sample_json()),
            ("bad.json", r#"{"name": "DS", "version": "1", "rules": "nope"}"#),
            ("broken.json", "{not json"),
        ]);

        let design_system = load_design_system(&root.join("good.json"))
            .await
            .expect("good");
        assert_eq!(design_system.rules.len(), 3);

        let error = load_design_system(&root.join("bad.json"))
            .await
            .expect_err("bad");
        assert!(error.to_string().contains("invalid design system format"));

        let error = load_design_system(&root.join("broken.json"))
            .await
            .expect_err("broken");
        assert!(error.to_string().contains("invalid JSON"));

        assert!(load_design_system(&root.join("missing.json")).await.is_err());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn fetch_options_follow_flags() {
        let options = fetch_options(&FetchArgs {
            timeout: 12,
            proxy: Some("https://proxy.example/?url=".to_string()),
            no_fallback: false,
        })
        .expect("options");
        assert_eq!(options.timeout, Duration::from_secs(12));
        assert_eq!(
            options.request_url("https://a.b/"),
            "https://proxy.example/?url=https%3A%2F%2Fa.b%2F"
        );

        let zero = FetchArgs {
            timeout: 0,
            proxy: None,
            no_fallback: false,
        };
        assert!(fetch_options(&zero).is_err());
    }

    #[tokio::test]
    async fn analyze_local_document_end_to_end() {
        let root = temp_dir_with(&[
            (
                "page.html",
                r#"<h1>Welcome</h1><img src="hero.png"><img src="logo.png" alt="Logo">"#,
            ),
            (
                "site.css",
                ".btn { background-color: #0066FF; border-radius: 8px; } h1 { font-weight: 400; }",
            ),
            ("ds.json", &sample_json()),
        ]);
        let report_path = root.join("out/report.json");
        let args = AnalyzeArgs {
            target: TargetArgs {
                url: None,
                html: Some(root.join("page.html")),
                css: Some(root.join("site.css")),
            },
            design_system: root.join("ds.json"),
            fetch: offline_fetch(),
            report: OutputArgs {
                format: OutputFormat::Json,
                report_output: Some(report_path.clone()),
            },
            fail_on_error: true,
        };

        let report = run_analyze(&args).await.expect("report");
        assert_eq!(report.summary.correct, 4);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.summary.errors, 1);
        assert!(report.has_errors());

        let written = std::fs::read_to_string(&report_path).expect("read report");
        let parsed: Report = serde_json::from_str(&written).expect("parse report");
        assert_eq!(parsed.summary, report.summary);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn analyze_reports_invalid_design_system_before_fetching() {
        let root = temp_dir_with(&[("ds.json", r#"{"name": "", "version": "1", "rules": []}"#)]);
        let args = AnalyzeArgs {
            target: url_target("https://example.invalid"),
            design_system: root.join("ds.json"),
            fetch: offline_fetch(),
            report: OutputArgs {
                format: OutputFormat::Text,
                report_output: None,
            },
            fail_on_error: false,
        };

        let error = run_analyze(&args).await.expect_err("invalid design system");
        assert!(error.to_string().contains("invalid design system format"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn emit_report_supports_formats() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let report = Report::new("https://example.com", Vec::new());

        let markdown_path = root.join("out/report.md");
        let output = OutputArgs {
            format: OutputFormat::Markdown,
            report_output: Some(markdown_path.clone()),
        };
        emit_report(&report, &output).await.expect("emit markdown");
        let contents = std::fs::read_to_string(&markdown_path).expect("read markdown");
        assert!(contents.contains("# DesignGuard Report"));

        let text_path = root.join("out/report.txt");
        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: Some(text_path.clone()),
        };
        emit_report(&report, &output).await.expect("emit text");
        let contents = std::fs::read_to_string(&text_path).expect("read text");
        assert!(contents.contains("Findings: none"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn render_report_text_lists_findings() {
        let root_report = {
            let target = designguard_core::inline_document_url(
                r#"<h2>Section</h2><img src="a.png">"#,
                ".card { border-radius: 4px; }",
            );
            designguard_core::Analyzer::new(InlineSource)
                .with_fallback(None)
                .analyze(&target, &sample_design_system(), |_| {})
                .expect("report")
        };

        let output = render_report_text(&root_report);
        assert!(output.contains("Target: inline HTML document"));
        assert!(output.contains("Summary: 1 correct, 1 warnings, 1 errors (3 total)"));
        assert!(output.contains("- [warn] button-border-radius Layout CSS"));
        assert!(output.contains("- [error] img-alt-text img[src=\"a.png\"]"));
        assert!(output.contains("- [ok] heading-structure h1-h6"));
        assert_eq!(
            root_report.findings_with_status(FindingStatus::Error).len(),
            1
        );
    }

    #[tokio::test]
    async fn validate_summarizes_or_rejects() {
        let root = temp_dir_with(&[
            ("good.json", &sample_json()),
            ("bad.json", r#"{"name": "DS", "version": "1", "rules": [{}]}"#),
        ]);

        let summary = run_validate(&root.join("good.json")).await.expect("valid");
        assert!(summary.contains("Design system: Sample Design System 1.0.0"));
        assert!(summary.contains("[typography] heading-font-weight font-weight = 600"));

        let error = run_validate(&root.join("bad.json")).await.expect_err("invalid");
        assert!(error.to_string().contains("is not a valid design system"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn render_design_system_text_handles_empty_rules() {
        let design_system = DesignSystem {
            name: "Empty".to_string(),
            version: "0.1.0".to_string(),
            rules: Vec::new(),
            metadata: None,
        };
        let output = render_design_system_text(&design_system);
        assert!(output.contains("Design system: Empty 0.1.0"));
        assert!(output.contains("Rules: none"));
    }

    #[tokio::test]
    async fn sample_round_trips_through_validation() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let path = root.join("sample.json");

        run_sample(Some(&path)).await.expect("write sample");
        let contents = std::fs::read_to_string(&path).expect("read sample");
        let design_system = DesignSystem::from_json(&contents).expect("valid sample");
        assert_eq!(design_system.rules, sample_design_system().rules);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }
}
