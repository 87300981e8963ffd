//! Command line driver for Gluon disk images.

mod logger;

use std::error::Error as StdError;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gluon::{Error, FileDisk, FileSystem, SynchDisk};
use log::debug;

type CliResult = Result<(), Box<dyn StdError>>;

fn path(help: &'static str) -> Arg<'static, 'static> {
    Arg::with_name("path").required(true).help(help)
}

fn app() -> App<'static, 'static> {
    let host = Arg::with_name("host").required(true).help("File on the host");

    App::new("gluon")
        .about("Manipulates a Gluon disk image")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("disk")
                .short("d")
                .long("disk")
                .takes_value(true)
                .default_value("DISK")
                .help("Disk image to operate on"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Logs file system operations, twice for sector I/O"),
        )
        .subcommand(
            SubCommand::with_name("format").about("Formats the disk, creating it if needed"),
        )
        .subcommand(
            SubCommand::with_name("cp")
                .about("Copies a host file into the file system")
                .arg(host.clone())
                .arg(path("Destination path")),
        )
        .subcommand(
            SubCommand::with_name("append")
                .about("Appends a host file to a file, creating it if needed")
                .arg(host)
                .arg(path("Destination path")),
        )
        .subcommand(
            SubCommand::with_name("mkdir")
                .about("Creates a directory")
                .arg(path("Directory path")),
        )
        .subcommand(
            SubCommand::with_name("cat")
                .about("Dumps a file or directory")
                .arg(path("Path")),
        )
        .subcommand(
            SubCommand::with_name("rm")
                .about("Removes a file or directory")
                .arg(
                    Arg::with_name("recursive")
                        .short("r")
                        .help("Removes a non-empty directory and everything in it"),
                )
                .arg(path("Path")),
        )
        .subcommand(
            SubCommand::with_name("cd")
                .about("Changes the current directory")
                .arg(path("Directory path")),
        )
        .subcommand(SubCommand::with_name("ls").about("Lists the current directory"))
        .subcommand(SubCommand::with_name("pwd").about("Prints the current directory"))
        .subcommand(SubCommand::with_name("print").about("Dumps the whole file system"))
}

fn main() -> ExitCode {
    let matches = app().get_matches();
    if let Err(e) = logger::init(matches.occurrences_of("verbose")) {
        eprintln!("gluon: {}", e);
    }
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gluon: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &ArgMatches) -> CliResult {
    let image = matches.value_of("disk").unwrap_or("DISK");
    let disk = Arc::new(SynchDisk::new(FileDisk::open(image)?));

    let (name, sub) = matches.subcommand();
    let sub = sub.ok_or(Error::InvalidPath)?;
    if name == "format" {
        FileSystem::format(disk)?.unmount();
        return Ok(());
    }

    let mut fs = FileSystem::mount(Arc::clone(&disk))?;
    let path = sub.value_of("path").unwrap_or_default();
    match name {
        "cp" => copy(&mut fs, sub.value_of("host").unwrap_or_default(), path)?,
        "append" => append(&mut fs, sub.value_of("host").unwrap_or_default(), path)?,
        "mkdir" => fs.mkdir(path)?,
        "cat" => print!("{}", fs.cat(path)?),
        "rm" => fs.remove(path, sub.is_present("recursive"))?,
        "cd" => fs.change_dir(path)?,
        "ls" => {
            for name in fs.list() {
                println!("{}", name);
            }
        }
        "pwd" => println!("{}", fs.pwd()),
        "print" => print!("{}", fs.print()),
        _ => unreachable!("clap rejects unknown subcommands"),
    }

    let stats = fs.stats();
    debug!("{} sector reads, {} sector writes", stats.reads, stats.writes);
    fs.unmount();
    Ok(())
}

fn copy(fs: &mut FileSystem<FileDisk>, host: &str, path: &str) -> CliResult {
    let data = std::fs::read(host)?;
    debug!("copying {} ({} bytes) to {}", host, data.len(), path);
    fs.create(path, data.len())?;
    let file = fs.open(path)?;
    let written = file.write_at(&data, 0);
    if written != data.len() {
        return Err(Box::new(Error::WriteError));
    }
    Ok(())
}

fn append(fs: &mut FileSystem<FileDisk>, host: &str, path: &str) -> CliResult {
    let data = std::fs::read(host)?;
    let mut file = match fs.open(path) {
        Ok(file) => file,
        Err(Error::NotFound) => {
            fs.create(path, 0)?;
            fs.open(path)?
        }
        Err(e) => return Err(Box::new(e)),
    };
    debug!("appending {} ({} bytes) to {}", host, data.len(), path);
    let written = fs.append(&mut file, &data)?;
    if written != data.len() {
        return Err(Box::new(Error::WriteError));
    }
    Ok(())
}
