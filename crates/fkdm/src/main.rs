//! `fkdm` - CLI for FKDM activity reporting
//!
//! Every protected command passes through the navigation guard first; a
//! refusal is reported and the process exits non-zero.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use fkdm::cli::{fill_form, Cli, Command, ConfigCommand, ProfileCommand, ReportCommand};
use fkdm::config::OpenerKind;
use fkdm::navigation::Navigation;
use fkdm::presenter::{summary_line, Presentation, ShareTarget};
use fkdm::report::{ReportField, BIDANG_OPTIONS, INSTANSI_OPTIONS};
use fkdm::{init_logging, App, Config, Route};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => {
            if let Command::Report(ReportCommand::Share { print: true, .. }) = &command {
                config.share.opener = OpenerKind::Print;
            }
            let mut app = App::open(config)?;
            run(&mut app, command)
        }
    }
}

fn run(app: &mut App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login(login) => handle_login(app, &login.username, &login.password),
        Command::Logout => {
            app.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Dashboard(flag) => handle_dashboard(app, flag.json),
        Command::Report(report_cmd) => handle_report(app, report_cmd),
        Command::Profile(profile_cmd) => handle_profile(app, &profile_cmd),
        Command::Go { path } => handle_go(app, &path),
        Command::Status(flag) => handle_status(app, flag.json),
        Command::Config(config_cmd) => handle_config(app.config(), config_cmd),
    }
}

fn handle_login(app: &mut App, username: &str, password: &str) -> anyhow::Result<()> {
    if let Navigation::Redirect(to) = app.navigate(Route::Login) {
        if let Some(user) = app.session().current() {
            println!("Already logged in as {}, going to {to}", user.username);
        }
        return render_route(app, to);
    }

    if !app.login(username, password)? {
        bail!("login failed: wrong username or password");
    }
    if let Some(user) = app.session().current() {
        println!("Logged in as {} ({})", user.full_name, user.fkdm_id);
    }
    Ok(())
}

fn handle_dashboard(app: &App, json: bool) -> anyhow::Result<()> {
    app.enter(Route::Dashboard)?;
    let dashboard = app.dashboard()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print!("{}", dashboard.render());
    }
    Ok(())
}

fn handle_report(app: &App, cmd: ReportCommand) -> anyhow::Result<()> {
    match cmd {
        ReportCommand::New(args) => {
            app.enter(Route::CreateReport)?;
            let mut form = app.new_form();
            fill_form(&mut form, &args);

            let report = match app.submit(&form) {
                Ok(report) => report,
                Err(e) if e.is_validation_failure() => return Err(e.into()),
                Err(e) => return Err(anyhow::Error::new(e).context("failed to save report")),
            };
            println!("Report saved: {}", report.id);
            println!();
            show_report(app, &report.id, false)
        }
        ReportCommand::List { json } => {
            app.enter(Route::Dashboard)?;
            let reports = app.reports().list_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No reports yet.");
            } else {
                for report in &reports {
                    println!("{}", summary_line(report));
                }
            }
            Ok(())
        }
        ReportCommand::Show { id, json } => {
            app.enter(Route::ViewReport(id.clone()))?;
            show_report(app, &id, json)
        }
        ReportCommand::Transcript { id } => {
            app.enter(Route::ViewReport(id.clone()))?;
            match app.view(&id)? {
                Presentation::Found(view) => {
                    println!("{}", view.transcript);
                    Ok(())
                }
                Presentation::NotFound { back } => not_found(&id, &back),
            }
        }
        ReportCommand::Share { id, to, print } => {
            app.enter(Route::ViewReport(id.clone()))?;
            let target = ShareTarget::from(to);
            match app.share(&id, target)? {
                Some(_) if !print => println!("Opening {target}..."),
                Some(_) => {}
                None => return not_found(&id, &Route::Dashboard),
            }
            Ok(())
        }
        ReportCommand::Options => {
            println!("Bidang:   {}", BIDANG_OPTIONS.join(", "));
            println!("Instansi: {}", INSTANSI_OPTIONS.join(", "));
            Ok(())
        }
    }
}

fn show_report(app: &App, id: &str, json: bool) -> anyhow::Result<()> {
    match app.view(id)? {
        Presentation::Found(view) if json => {
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
        Presentation::Found(view) => {
            print!("{}", view.render_detail());
            println!();
            println!("Preview Format Sharing");
            println!("----------------------");
            println!("{}", view.transcript);
            Ok(())
        }
        Presentation::NotFound { back } => not_found(id, &back),
    }
}

fn not_found(id: &str, back: &Route) -> anyhow::Result<()> {
    bail!("report {id} not found (back to {back})")
}

fn handle_profile(app: &mut App, cmd: &ProfileCommand) -> anyhow::Result<()> {
    app.enter(Route::Profile)?;

    if let Some(update) = cmd.to_update() {
        if update.is_empty() {
            bail!("nothing to update; pass at least one of --username, --full-name, --fkdm-id, --kelurahan");
        }
        app.update_profile(update)
            .context("failed to update profile")?;
        println!("Profile updated.");
    }

    let json = matches!(cmd, ProfileCommand::Show { json: true });
    print_profile(app, json)
}

fn print_profile(app: &App, json: bool) -> anyhow::Result<()> {
    let Some(user) = app.session().current() else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("Username:   {}", user.username);
        println!("Full name:  {}", user.full_name);
        println!("FKDM id:    {}", user.fkdm_id);
        println!("Kelurahan:  {}", user.kelurahan);
    }
    Ok(())
}

fn handle_go(app: &App, path: &str) -> anyhow::Result<()> {
    let route: Route = path.parse()?;
    let target = match app.navigate(route) {
        Navigation::Allow(route) => route,
        Navigation::Redirect(to) => {
            println!("-> {to}");
            to
        }
    };
    render_route(app, target)
}

fn render_route(app: &App, route: Route) -> anyhow::Result<()> {
    match route {
        Route::Login => {
            println!("Log in with: fkdm login -u <username> -p <password>");
            Ok(())
        }
        Route::Root | Route::Dashboard => handle_dashboard(app, false),
        Route::CreateReport => {
            app.enter(Route::CreateReport)?;
            let form = app.new_form();
            println!("Buat Laporan Kegiatan FKDM");
            for field in ReportField::ALL {
                let marker = if field.is_required() { "*" } else { " " };
                let value = form.get(field).unwrap_or_default();
                println!("{marker} {:<20} {value}", field.label());
            }
            println!();
            println!("Bidang:   {}", BIDANG_OPTIONS.join(", "));
            println!("Instansi: {}", INSTANSI_OPTIONS.join(", "));
            Ok(())
        }
        Route::ViewReport(id) => show_report(app, &id, false),
        Route::Profile => print_profile(app, false),
    }
}

fn handle_status(app: &App, json: bool) -> anyhow::Result<()> {
    let database = app.config().database_path();
    let user = app.session().current();
    let reports = app.reports().count()?;
    let used = app.store().used_bytes()?;
    let quota = app.store().quota();

    if json {
        let status = serde_json::json!({
            "database_path": database,
            "logged_in": user.map(|u| u.username.clone()),
            "reports": reports,
            "used_bytes": used,
            "quota_bytes": quota,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("fkdm status");
        println!("-----------");
        println!("Database:   {}", database.display());
        match user {
            Some(user) => println!("Session:    logged in as {}", user.username),
            None => println!("Session:    not logged in"),
        }
        println!("Reports:    {reports}");
        match quota {
            Some(quota) => println!("Storage:    {used} / {quota} bytes"),
            None => println!("Storage:    {used} bytes (no quota)"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!("  Quota (bytes):   {}", config.storage.quota_bytes);
                println!("  Session slot:    {}", config.storage.session_slot);
                println!("  Reports slot:    {}", config.storage.reports_slot);
                println!();
                println!("[Session]");
                println!("  Strict restore:  {}", config.session.strict_restore);
                println!();
                println!("[Share]");
                println!("  WhatsApp:        {}", config.share.whatsapp_template);
                println!("  Telegram:        {}", config.share.telegram_template);
                println!("  Opener:          {:?}", config.share.opener);
                println!();
                println!("[Dashboard]");
                println!("  Recent limit:    {}", config.dashboard.recent_limit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
