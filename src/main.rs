use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use std::io::{BufRead, Write};
use surat_keluar::config::{Command, FilterArgs};
use surat_keluar::core::autocomplete::{self, Suggestions};
use surat_keluar::core::{dashboard, export, letters, pagination};
use surat_keluar::domain::model::{Letter, LetterDraft, LetterFilter};
use surat_keluar::domain::numbering::{self, DEFAULT_INSTITUTION_CODE};
use surat_keluar::domain::ports::ConfigProvider;
use surat_keluar::utils::error::ErrorSeverity;
use surat_keluar::utils::{logger, validation::Validate};
use surat_keluar::{
    AppConfig, AuthService, CliConfig, CsvExporter, DashboardService, LetterService,
    LocalStorage, RecipientLookup, RestBackend, Result,
};

const BAR_WIDTH: usize = 30;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // logging first, so config errors are reported
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // exit code by severity; Low still counts as success
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: CliConfig) -> Result<()> {
    let today = Local::now().date_naive();

    // preview is offline; it only needs the institution code
    if let Command::Preview {
        nomor,
        suffix,
        jenis,
        tanggal,
    } = &cli.command
    {
        let code = AppConfig::load(cli.config.as_deref())
            .map(|config| config.institution.code)
            .unwrap_or_else(|_| DEFAULT_INSTITUTION_CODE.to_string());
        let draft = LetterDraft {
            nomor_urut: nomor.clone(),
            suffix: suffix.clone(),
            jenis_surat: jenis.clone(),
            tanggal_surat: tanggal.clone().unwrap_or_else(|| today.to_string()),
            ..LetterDraft::default()
        };
        println!("{}", letters::preview(&draft, &code)?);
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let backend = RestBackend::from_config(&config)?;
    let auth = AuthService::new(backend.clone(), LocalStorage::new(config.session_dir()));

    match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let session = auth.login(&email, &password).await?;
            println!("✅ Login berhasil: {}", session.user.display_name());
            return Ok(());
        }
        Command::Logout => {
            auth.logout().await?;
            println!("👋 Logout berhasil");
            return Ok(());
        }
        Command::Whoami => {
            let user = auth.whoami().await?;
            println!("{} <{}>", user.display_name(), user.email);
            return Ok(());
        }
        _ => {}
    }

    // everything below reads or writes letters and needs a signed-in user
    let session = auth.load_session().await?;
    let backend = backend.with_session(session.access_token);
    let service = LetterService::from_config(backend.clone(), &config);

    match cli.command {
        Command::Types => {
            for letter_type in service.list_types().await? {
                println!("{}  {}", letter_type.kode, letter_type.nama_jenis);
            }
        }
        Command::List { filter, page } => {
            let filter = LetterFilter::from(filter);
            let page = service.list(&filter, page).await?;
            if page.items.is_empty() {
                println!("Tidak ada data surat");
                return Ok(());
            }

            for letter in &page.items {
                print_row(&service, letter)?;
            }

            let (from, to) = pagination::range_for(page.current_page, config.items_per_page());
            let shown_to = (to + 1).min(page.count);
            println!();
            println!("Menampilkan {}-{} dari {} surat", from + 1, shown_to, page.count);
            if let Some(window) = pagination::page_window(page.current_page, page.total_pages) {
                println!("{}", window);
            }
        }
        Command::Show { id } => {
            let letter = service.get(id).await?;
            print_detail(&service, &letter)?;
        }
        Command::Add { draft } => {
            let draft = draft.apply_to(LetterDraft {
                tanggal_surat: today.to_string(),
                ..LetterDraft::default()
            });
            let letter = service.create(&draft).await?;
            println!("✅ Surat berhasil ditambahkan: {}", service.full_number(&letter)?);
        }
        Command::Edit { id, draft } => {
            let current = service.get(id).await?;
            let draft = draft.apply_to(letters::draft_from_letter(&current));
            let letter = service.update(id, &draft).await?;
            println!("✅ Surat berhasil diperbarui: {}", service.full_number(&letter)?);
        }
        Command::Delete { id, yes } => {
            let letter = service.get(id).await?;
            let nomor = service.full_number(&letter)?;
            if !yes && !confirm(&format!("Hapus surat {}?", nomor))? {
                println!("Dibatalkan");
                return Ok(());
            }
            service.delete(id).await?;
            println!("🗑️ Surat {} dihapus", nomor);
        }
        Command::Check {
            nomor,
            suffix,
            tanggal,
            exclude,
        } => {
            let tanggal = tanggal.unwrap_or_else(|| today.to_string());
            let label = format!(
                "{}{}",
                numbering::pad_sequence(u64::from(numbering::parse_sequence(&nomor)?)),
                suffix.trim()
            );
            if service
                .check_duplicate(&nomor, &suffix, &tanggal, exclude)
                .await?
            {
                println!("❌ Nomor {} sudah digunakan", label);
            } else {
                println!("✅ Nomor {} tersedia", label);
            }
        }
        Command::Suggest { tahun } => {
            let tahun = tahun.unwrap_or_else(|| today.year()).to_string();
            println!("{}", service.suggest_number(&tahun).await?);
        }
        Command::Stats { tahun } => {
            let tahun = tahun.unwrap_or_else(|| today.year());
            let stats = DashboardService::new(backend).stats(tahun, today).await?;

            println!("Total surat {}: {}", tahun, stats.total_surat);
            println!("Surat bulan ini: {}", stats.surat_bulan_ini);
            println!("Nomor yang terlewat: {}", stats.gap_count);
            for item in &stats.surat_per_jenis {
                println!("  {:<20} {}", item.nama, item.count);
            }
        }
        Command::ChartMonthly { tahun } => {
            let tahun = tahun.unwrap_or_else(|| today.year());
            let counts = DashboardService::new(backend).monthly_counts(tahun).await?;
            let max = counts.iter().copied().max().unwrap_or(0);

            println!("Surat per bulan {}", tahun);
            for (label, count) in dashboard::MONTH_LABELS.iter().zip(counts) {
                println!(
                    "{:<4}│{:<width$} {}",
                    label,
                    dashboard::bar(count, max, BAR_WIDTH),
                    count,
                    width = BAR_WIDTH
                );
            }
        }
        Command::ChartTypes => {
            let types = service.list_types().await?;
            let shares = DashboardService::new(backend).type_distribution().await?;
            let max = shares.first().map(|s| s.count).unwrap_or(0);

            for share in shares {
                let nama = types
                    .iter()
                    .find(|t| t.kode == share.kode)
                    .map(|t| t.nama_jenis.as_str())
                    .unwrap_or(share.kode.as_str());
                println!(
                    "{:<20} {:<width$} {} ({:.1}%)",
                    nama,
                    dashboard::bar(share.count, max, BAR_WIDTH),
                    share.count,
                    share.percent,
                    width = BAR_WIDTH
                );
            }
        }
        Command::Recipients { query } => {
            let lookup = RecipientLookup::from_config(backend, &config);
            print_suggestions(lookup.suggest(&query).await?, config.min_search_chars());
        }
        Command::Export { filter, output } => {
            export_letters(&config, backend, filter, output, today).await?;
        }
        Command::Login { .. } | Command::Logout | Command::Whoami | Command::Preview { .. } => {}
    }

    Ok(())
}

async fn export_letters(
    config: &AppConfig,
    backend: RestBackend,
    filter: FilterArgs,
    output: Option<String>,
    today: NaiveDate,
) -> Result<()> {
    let storage = LocalStorage::new(config.export_dir());
    let file_name = output.unwrap_or_else(|| export::export_filename(today));
    let exporter = CsvExporter::new(backend, storage.clone(), config.institution_code());

    let summary = exporter
        .export(&LetterFilter::from(filter), &file_name)
        .await?;
    println!(
        "📁 {} surat di-export ke {}",
        summary.rows,
        storage.full_path(&summary.file_name).display()
    );
    Ok(())
}

fn print_row(service: &LetterService<RestBackend>, letter: &Letter) -> Result<()> {
    println!(
        "{:>5}  {:<32} {}  {:<16} {} → {}",
        letter.id,
        service.full_number(letter)?,
        numbering::format_display_date(letter.tanggal_surat),
        letter.type_name(),
        letter.perihal,
        letter.tujuan
    );
    Ok(())
}

fn print_detail(service: &LetterService<RestBackend>, letter: &Letter) -> Result<()> {
    let nomor = service.full_number(letter)?;
    println!("Nomor Surat : {}", nomor);
    println!("Tanggal     : {}", numbering::format_display_date(letter.tanggal_surat));
    println!("Jenis       : {}", letter.type_name());
    println!("Perihal     : {}", letter.perihal);
    println!("Tujuan      : {}", letter.tujuan);
    if let Some(keterangan) = letter.keterangan.as_deref().filter(|k| !k.is_empty()) {
        println!("Keterangan  : {}", keterangan);
    }
    println!();
    println!("{}", letters::copy_text(&nomor, letter.tanggal_surat));
    Ok(())
}

fn print_suggestions(suggestions: Suggestions, min_chars: usize) {
    let now = chrono::Utc::now();
    match suggestions {
        Suggestions::Recent(items) => {
            println!("Tujuan terakhir:");
            for item in items {
                println!(
                    "  {}  ({})",
                    item.tujuan,
                    autocomplete::format_time_ago(item.last_used, now)
                );
            }
        }
        Suggestions::Results { term, items } => {
            for item in items {
                let name = autocomplete::highlight(&item.tujuan, &term, "\x1b[1m", "\x1b[0m");
                match item.frequency {
                    Some(n) => println!("  {}  ({}x)", name, n),
                    None => println!("  {}", name),
                }
            }
        }
        Suggestions::TooShort => println!("Ketik minimal {} karakter", min_chars),
        Suggestions::NoResults(message) => println!("{}", message),
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "ya" | "yes"))
}
