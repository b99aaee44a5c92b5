// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: output format
fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_parser(["text", "json"])
        .default_value("text")
        .help("Output format")
}

/// Common argument: provider catalog file
fn catalog_arg() -> Arg {
    Arg::new("catalog")
        .long("catalog")
        .value_name("FILE")
        .help("Provider catalog (TOML); defaults to the built-in catalog")
}

/// Common argument: extracted partition directories
fn rootfs_arg() -> Arg {
    Arg::new("rootfs")
        .long("rootfs")
        .value_name("DIR")
        .action(ArgAction::Append)
        .help("Directory holding an extracted or mounted partition (repeatable)")
}

fn inspector_args() -> [Arg; 3] {
    [
        Arg::new("format_info")
            .long("format-info")
            .value_name("FILE")
            .help("Read captured qemu-img info JSON instead of running qemu-img"),
        Arg::new("qemu_img")
            .long("qemu-img")
            .default_value("qemu-img")
            .help("qemu-img binary"),
        Arg::new("timeout")
            .long("timeout")
            .default_value("60")
            .help("Seconds to wait for qemu-img"),
    ]
}

fn build_cli() -> Command {
    Command::new("cloudfit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Cloudfit Contributors")
        .about("Score virtual machine images for cloud provider compatibility")
        .subcommand_required(false)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("check")
                .about("Inspect an image and score it against every provider")
                .arg(Arg::new("image").required(true).help("Path to the disk image"))
                .arg(rootfs_arg())
                .arg(
                    Arg::new("sequential")
                        .long("sequential")
                        .action(ArgAction::SetTrue)
                        .help("Scan partitions one at a time"),
                )
                .args(inspector_args())
                .arg(catalog_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show normalized container format signals for an image")
                .arg(Arg::new("image").required(true).help("Path to the disk image"))
                .args(inspector_args())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("features")
                .about("Show the feature set detected on partition filesystems")
                .arg(rootfs_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("catalog")
                .about("Validate and print the provider catalog")
                .arg(catalog_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("cloudfit.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
