pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use command::{CliConfig, Command, DraftArgs, FilterArgs};

#[cfg(feature = "cli")]
mod command {
    use crate::domain::model::{LetterDraft, LetterFilter};
    use chrono::NaiveDate;
    use clap::{Args, Parser, Subcommand};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "surat")]
    #[command(about = "Outgoing letter register: numbering, search, statistics and CSV export")]
    pub struct CliConfig {
        /// Path to the TOML configuration file (defaults to ./surat.toml, then SURAT_* env)
        #[arg(short, long, global = true)]
        pub config: Option<PathBuf>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Sign in and store the session
        Login {
            #[arg(long)]
            email: String,
            /// Read from stdin when omitted
            #[arg(long)]
            password: Option<String>,
        },
        /// Sign out and remove the stored session
        Logout,
        /// Show the signed-in user
        Whoami,
        /// List letter types
        Types,
        /// List letters, newest first
        List {
            #[command(flatten)]
            filter: FilterArgs,
            #[arg(long, default_value = "1")]
            page: u32,
        },
        /// Show one letter
        Show { id: i64 },
        /// Register a new letter
        Add {
            #[command(flatten)]
            draft: DraftArgs,
        },
        /// Edit an existing letter; omitted fields keep their value
        Edit {
            id: i64,
            #[command(flatten)]
            draft: DraftArgs,
        },
        /// Delete a letter
        Delete {
            id: i64,
            #[arg(long, help = "Skip the confirmation prompt")]
            yes: bool,
        },
        /// Check whether a number is already used in the date's year
        Check {
            nomor: String,
            #[arg(long, default_value = "")]
            suffix: String,
            #[arg(long)]
            tanggal: Option<String>,
            #[arg(long, help = "Letter id to ignore (when editing)")]
            exclude: Option<i64>,
        },
        /// Suggest the next number and list gaps for a year
        Suggest {
            #[arg(long)]
            tahun: Option<i32>,
        },
        /// Format a letter number without contacting the backend
        Preview {
            nomor: String,
            #[arg(long, default_value = "")]
            suffix: String,
            #[arg(long)]
            jenis: String,
            #[arg(long)]
            tanggal: Option<String>,
        },
        /// Dashboard counters for a year
        Stats {
            #[arg(long)]
            tahun: Option<i32>,
        },
        /// Letters per month for a year
        ChartMonthly {
            #[arg(long)]
            tahun: Option<i32>,
        },
        /// Letters per type across all years
        ChartTypes,
        /// Recipient autocomplete; recent recipients when no query is given
        Recipients {
            #[arg(default_value = "")]
            query: String,
        },
        /// Export letters as CSV
        Export {
            #[command(flatten)]
            filter: FilterArgs,
            #[arg(short, long, help = "Output file name inside the export directory")]
            output: Option<String>,
        },
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct FilterArgs {
        #[arg(long)]
        pub tahun: Option<String>,
        /// Roman month code, I to XII
        #[arg(long)]
        pub bulan: Option<String>,
        /// Letter type code
        #[arg(long)]
        pub jenis: Option<String>,
        /// Matches subject or recipient
        #[arg(long)]
        pub search: Option<String>,
        #[arg(long)]
        pub dari: Option<NaiveDate>,
        #[arg(long)]
        pub sampai: Option<NaiveDate>,
    }

    impl From<FilterArgs> for LetterFilter {
        fn from(args: FilterArgs) -> Self {
            LetterFilter {
                tahun: args.tahun,
                kode_bulan: args.bulan.map(|b| b.to_uppercase()),
                jenis: args.jenis,
                search: args.search,
                tanggal_mulai: args.dari,
                tanggal_selesai: args.sampai,
            }
        }
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct DraftArgs {
        #[arg(long)]
        pub nomor: Option<String>,
        #[arg(long)]
        pub suffix: Option<String>,
        #[arg(long)]
        pub jenis: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        pub tanggal: Option<String>,
        #[arg(long)]
        pub perihal: Option<String>,
        #[arg(long)]
        pub tujuan: Option<String>,
        #[arg(long)]
        pub keterangan: Option<String>,
    }

    impl DraftArgs {
        /// Overlays the given flags on `base`.
        pub fn apply_to(self, mut base: LetterDraft) -> LetterDraft {
            if let Some(v) = self.nomor {
                base.nomor_urut = v;
            }
            if let Some(v) = self.suffix {
                base.suffix = v;
            }
            if let Some(v) = self.jenis {
                base.jenis_surat = v;
            }
            if let Some(v) = self.tanggal {
                base.tanggal_surat = v;
            }
            if let Some(v) = self.perihal {
                base.perihal = v;
            }
            if let Some(v) = self.tujuan {
                base.tujuan = v;
            }
            if let Some(v) = self.keterangan {
                base.keterangan = v;
            }
            base
        }
    }

}
