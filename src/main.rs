use clap::Parser;
use contract_wizard::config::CliArgs;
use contract_wizard::core::document::{default_export_options, render_final_document};
use contract_wizard::core::prompt::build_prompt;
use contract_wizard::core::signature::StrokeStyle;
use contract_wizard::domain::ports::DocumentExporter;
use contract_wizard::utils::error::ErrorSeverity;
use contract_wizard::utils::{logger, validation::Validate};
use contract_wizard::{
    ExternalPdfExporter, GeminiGenerator, HtmlFileExporter, PartyRole, SessionScript, SignaturePad,
    ViaCepLookup, WizardConfig, WizardSession,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting contract-wizard");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match WizardConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(output) = &args.output {
        config.export.output_dir = output.clone();
        tracing::info!("🔧 Output directory overridden to: {}", output);
    }

    let script = match SessionScript::from_file(&args.session) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("❌ Failed to load session script '{}': {}", args.session, e);
            std::process::exit(1);
        }
    };

    // 驗證配置
    for result in [config.validate(), script.validate()] {
        if let Err(e) = result {
            tracing::error!("❌ Validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    match run(&args, &config, &script).await {
        Ok(path) => {
            if let Some(path) = path {
                tracing::info!("✅ Contract completed successfully!");
                println!("✅ Contract completed successfully!");
                println!("📁 Output saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Contract wizard failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 4,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

/// Runs the whole wizard once. `Ok(None)` is a dry run.
async fn run(
    args: &CliArgs,
    config: &WizardConfig,
    script: &SessionScript,
) -> contract_wizard::Result<Option<String>> {
    let lookup = ViaCepLookup::with_timeout(&config.address_lookup.endpoint, config.lookup_timeout())?;
    let generator = GeminiGenerator::new(
        &config.generation.endpoint,
        &config.generation.model,
        &config.generation.api_key,
    )
    .with_timeout(config.generation_timeout())?;

    let mut session = WizardSession::new(lookup, generator).with_temperature(config.temperature());

    script.fill_details(&mut session)?;
    session.settle().await;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the generation service will not be called");
        println!("{}", build_prompt(session.wizard().record()));
        return Ok(None);
    }

    session.generate().await?;

    if let Some(text) = &script.contract_edit {
        session.edit_contract(text.clone())?;
    }
    session.approve()?;

    let style = StrokeStyle {
        width: config.signature.stroke_width,
        ..StrokeStyle::default()
    };
    for role in [PartyRole::Provider, PartyRole::Client] {
        let mut pad = SignaturePad::with_style(config.signature.width, config.signature.height, style);
        script.draw(role, &mut pad);
        match pad.confirm()? {
            Some(event) => session.apply_pad_event(role, event)?,
            None => tracing::warn!("✒️  No strokes for the {} signature", role.key()),
        }
    }

    session.finalize()?;

    let record = session.wizard().record();
    let html = render_final_document(record);
    let mut options = default_export_options(record);
    if let Some(q) = config.export.image_quality {
        options.image_quality = q;
    }

    let exported = if args.html_only {
        HtmlFileExporter::new(&config.export.output_dir)
            .export(&html, &options)
            .await?
    } else {
        let exporter = ExternalPdfExporter::new(&config.export.pdf_program, &config.export.output_dir)
            .with_args(config.export.pdf_args.clone().unwrap_or_default());
        exporter.export(&html, &options).await?
    };

    Ok(Some(exported.display().to_string()))
}
