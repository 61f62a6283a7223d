//! keylab CLI
//!
//! Identity-derived keys, toy XOR signatures and a toy XOR cipher

mod config;
mod progress;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use keylab_crypto::cipher::{Ciphertext, SymmetricCipher};
use keylab_crypto::digest::{HashOutput, digest_reader, to_hex};
use keylab_crypto::files;
use keylab_crypto::identity::{CipherIdentity, SigningIdentity};
use keylab_crypto::keys::{KeyDeriver, SymmetricKey};
use keylab_crypto::keystore::{
    KeyStore, SigningKeyRecord, StoredKeyRecord, SymmetricKeyRecord,
};
use keylab_crypto::signatures::SignatureEngine;
use keylab_crypto::{CryptoError, ErrorKind};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use config::Config;
use progress::{HashProgress, format_bytes};

/// keylab - identity-derived keys, toy signatures and a toy cipher
#[derive(Parser)]
#[command(name = "keylab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path [default: <config dir>/keylab/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive signing keys, sign documents and verify signatures
    #[command(subcommand)]
    Signature(SignatureCommand),

    /// Derive a cipher key, encrypt and decrypt messages
    #[command(subcommand)]
    Cipher(CipherCommand),

    /// Print the digest of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },

    /// Inspect stored keys
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Subcommand)]
enum SignatureCommand {
    /// Derive a signing key pair and save it
    Keygen {
        /// Owner name
        #[arg(long)]
        name: String,

        /// Birthdate as DDMMYYYY
        #[arg(long)]
        birthdate: String,

        /// Secret word (prompted without echo when omitted)
        #[arg(long)]
        secret: Option<String>,
    },

    /// Sign a file, writing <file>.sig
    Sign {
        /// File to sign
        file: PathBuf,
    },

    /// Check <file>.sig against a file
    Verify {
        /// Signed file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum CipherCommand {
    /// Derive a cipher key and save it
    Keygen {
        /// Owner e-mail
        #[arg(long)]
        email: String,

        /// Birthdate (any non-empty text)
        #[arg(long)]
        birthdate: String,
    },

    /// Encrypt a message (read from stdin when --message is omitted)
    Encrypt {
        /// Message text
        #[arg(short, long)]
        message: Option<String>,

        /// Save the ciphertext to this file
        #[arg(short, long, conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Save the ciphertext to the configured message file
        #[arg(long)]
        save: bool,
    },

    /// Decrypt a message (from the configured message file by default)
    Decrypt {
        /// Ciphertext text
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        /// File holding the ciphertext
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Print the stored key records
    Show,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default()?,
    };

    // Validate configuration
    config.validate()?;

    init_logging(cli.verbose, &config)?;

    match cli.command {
        Commands::Signature(command) => match command {
            SignatureCommand::Keygen {
                name,
                birthdate,
                secret,
            } => signature_keygen(&name, &birthdate, secret, &config),
            SignatureCommand::Sign { file } => sign_file(&file, &config),
            SignatureCommand::Verify { file } => verify_file(&file, &config),
        },
        Commands::Cipher(command) => match command {
            CipherCommand::Keygen { email, birthdate } => cipher_keygen(&email, &birthdate, &config),
            CipherCommand::Encrypt {
                message,
                output,
                save,
            } => encrypt_message(message, output, save, &config),
            CipherCommand::Decrypt { text, input } => decrypt_message(text, input, &config),
        },
        Commands::Hash { file } => hash_file(&file, &config),
        Commands::Key(KeyCommand::Show) => show_keys(&config),
    }
}

/// Install the tracing subscriber
fn init_logging(verbose: bool, config: &Config) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    match &config.logging.file {
        Some(path) => {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Derive a signing key pair and store it
fn signature_keygen(
    name: &str,
    birthdate: &str,
    secret: Option<String>,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let secret = match secret {
        Some(secret) => Zeroizing::new(secret),
        None => Zeroizing::new(
            rpassword::prompt_password("Secret word: ").context("Failed to read secret word")?,
        ),
    };

    let identity = SigningIdentity::new(name.trim(), birthdate.trim(), secret.trim())?;
    let pair = KeyDeriver::new(config.digest.algorithm).derive_signing_keys(&identity);

    let store = KeyStore::new(&config.keys.signing_key_file);
    store.save(&SigningKeyRecord::new(identity.name(), &pair).into())?;
    tracing::info!(path = %store.path().display(), "signing key saved");

    println!("Name:          {}", identity.name());
    println!("Identity hash: {}", pair.digest_hex());
    println!("Private key:   {}", pair.private_key());
    println!("Public key:    {}", pair.public_key());
    println!("Saved to:      {}", store.path().display());

    Ok(ExitCode::SUCCESS)
}

/// Sign a file and write its signature file
fn sign_file(file: &Path, config: &Config) -> anyhow::Result<ExitCode> {
    let record = load_signing_key(config)?;
    let engine = SignatureEngine::new(config.digest.algorithm);

    let digest = hash_document(file, config)?;
    let signature = engine.sign_digest(&digest, record.private_key);
    let sig_path = files::write_signature(file, &signature)?;

    println!("Document hash: {}", to_hex(&digest));
    println!("Signature:     {signature}");
    println!("Saved to:      {}", sig_path.display());

    Ok(ExitCode::SUCCESS)
}

/// Verify a file against its signature file
fn verify_file(file: &Path, config: &Config) -> anyhow::Result<ExitCode> {
    let record = load_signing_key(config)?;
    let engine = SignatureEngine::new(config.digest.algorithm);

    let digest = hash_document(file, config)?;
    let signature = files::read_signature(file)?;
    let valid = engine.verify_digest(&digest, &signature, record.private_key);

    println!("Document hash: {}", to_hex(&digest));
    println!("Signature:     {signature}");

    if valid {
        println!("Status:        {}", style("VALID").green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Status:        {}", style("FORGED").red().bold());
        Ok(ExitCode::FAILURE)
    }
}

/// Derive a cipher key and store it
fn cipher_keygen(email: &str, birthdate: &str, config: &Config) -> anyhow::Result<ExitCode> {
    let identity = CipherIdentity::new(email.trim(), birthdate.trim())?;
    let key = KeyDeriver::new(config.digest.algorithm).derive_symmetric_key(&identity);

    let store = KeyStore::new(&config.keys.symmetric_key_file);
    store.save(&SymmetricKeyRecord::new(&key).into())?;
    tracing::info!(path = %store.path().display(), "symmetric key saved");

    println!("Owner:    {}", key.owner());
    println!("Key:      {}", Zeroizing::new(key.to_hex()).as_str());
    println!("Saved to: {}", store.path().display());

    Ok(ExitCode::SUCCESS)
}

/// Encrypt a message with the stored cipher key
fn encrypt_message(
    message: Option<String>,
    output: Option<PathBuf>,
    save: bool,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let key = load_symmetric_key(config)?;

    let message = Zeroizing::new(match message {
        Some(message) => message,
        None => read_stdin_message()?,
    });
    ensure_message(&message)?;

    let ciphertext = SymmetricCipher::base64().encrypt(message.as_bytes(), key.as_bytes())?;
    println!("Ciphertext: {ciphertext}");

    let target = output.or_else(|| save.then(|| config.cipher.message_file.clone()));
    if let Some(path) = target {
        files::write_ciphertext(&path, &ciphertext)?;
        println!("Saved to:   {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Decrypt a message with the stored cipher key
fn decrypt_message(
    text: Option<String>,
    input: Option<PathBuf>,
    config: &Config,
) -> anyhow::Result<ExitCode> {
    let key = load_symmetric_key(config)?;

    let ciphertext = match (text, input) {
        (Some(text), _) => Ciphertext::new(text),
        (None, Some(path)) => files::read_ciphertext(&path)?,
        (None, None) => files::read_ciphertext(&config.cipher.message_file)?,
    };

    match SymmetricCipher::base64().decrypt_ciphertext(&ciphertext, key.as_bytes()) {
        Ok(message) => {
            println!("{}", Zeroizing::new(message).as_str());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.kind() == ErrorKind::Decode => {
            println!(
                "{} wrong key or corrupted data ({e})",
                style("Decryption failed:").red().bold()
            );
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Print the digest of a file
fn hash_file(file: &Path, config: &Config) -> anyhow::Result<ExitCode> {
    let digest = hash_document(file, config)?;
    println!("{}  {}", to_hex(&digest), file.display());
    Ok(ExitCode::SUCCESS)
}

/// Print both key files
fn show_keys(config: &Config) -> anyhow::Result<ExitCode> {
    for path in [&config.keys.signing_key_file, &config.keys.symmetric_key_file] {
        let store = KeyStore::new(path);
        println!("{}", style(store.path().display()).bold());

        match store.load()? {
            Some(StoredKeyRecord::Signing(record)) => {
                println!("  kind:             signing");
                println!("  name:             {}", record.name);
                println!("  private_key:      {}", record.private_key);
                println!("  public_key:       {}", record.public_key);
                println!("  private_key_hash: {}", record.private_key_hash);
            }
            Some(StoredKeyRecord::Symmetric(record)) => {
                println!("  kind:             symmetric");
                println!("  email:            {}", record.email);
                println!("  secret_key:       {}", record.secret_key);
            }
            None => println!("  {}", style("(no key)").dim()),
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Digest a file with the configured algorithm, showing progress for large files
fn hash_document(path: &Path, config: &Config) -> anyhow::Result<HashOutput> {
    let file = files::open_document(path)?;
    let size = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();

    tracing::info!(
        path = %path.display(),
        size = %format_bytes(size),
        algorithm = %config.digest.algorithm,
        "hashing document"
    );

    let progress = if config.progress.enabled && size >= config.progress.threshold_bytes {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        HashProgress::new(size, filename)
    } else {
        HashProgress::hidden()
    };

    match digest_reader(&config.digest.algorithm, file, |hashed| progress.update(hashed)) {
        Ok(digest) => {
            progress.finish();
            Ok(digest)
        }
        Err(e) => {
            progress.abandon();
            Err(e).with_context(|| format!("Failed to read {}", path.display()))
        }
    }
}

fn load_signing_key(config: &Config) -> anyhow::Result<SigningKeyRecord> {
    KeyStore::new(&config.keys.signing_key_file)
        .load_signing()
        .map_err(|e| with_keygen_hint(e, "signature"))
}

fn load_symmetric_key(config: &Config) -> anyhow::Result<SymmetricKey> {
    let record = KeyStore::new(&config.keys.symmetric_key_file)
        .load_symmetric()
        .map_err(|e| with_keygen_hint(e, "cipher"))?;
    Ok(record.symmetric_key()?)
}

fn with_keygen_hint(err: CryptoError, group: &str) -> anyhow::Error {
    match err {
        CryptoError::KeyNotFound(_) | CryptoError::KeyKindMismatch { .. } => {
            anyhow::anyhow!("{err}. Run `keylab {group} keygen` first")
        }
        other => other.into(),
    }
}

/// Read the message from stdin, dropping one trailing line break
fn read_stdin_message() -> anyhow::Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read message from stdin")?;

    Ok(strip_line_break(&input).to_string())
}

/// Only a zero-length message is refused; whitespace is a valid message
fn ensure_message(message: &str) -> anyhow::Result<()> {
    if message.is_empty() {
        anyhow::bail!("Message must not be empty");
    }
    Ok(())
}

/// Drop a single trailing `\n` or `\r\n`
fn strip_line_break(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}
