use clap::Parser;
use std::path::PathBuf;
use std::process::{self, Command};
use std::{error, fs};

#[derive(Parser)]
#[command(version, about = "Compiler for the sl language", long_about = None)]
struct Cli {
  /// Source file to compile.
  input_file: PathBuf,

  /// Where to write the generated assembly.
  #[arg(short, long, value_name = "FILE", default_value = "out.asm")]
  output_file: PathBuf,

  /// Stop after writing the assembly instead of assembling and linking.
  #[arg(long)]
  emit_asm: bool,
}

fn main() {
  let cli = Cli::parse();
  if let Err(err) = run(&cli) {
    eprintln!("{err}");
    process::exit(1);
  }
}

fn run(cli: &Cli) -> Result<(), Box<dyn error::Error>> {
  let source = fs::read_to_string(&cli.input_file)?;
  let asm = slc::compile(&source)?;
  fs::write(&cli.output_file, &asm)?;

  if cli.emit_asm {
    return Ok(());
  }

  let object_file = cli.output_file.with_extension("o");
  run_tool(
    Command::new("nasm")
      .arg("-felf64")
      .arg(&cli.output_file)
      .arg("-o")
      .arg(&object_file),
  )?;
  run_tool(
    Command::new("ld")
      .arg("-o")
      .arg(cli.output_file.with_extension(""))
      .arg(&object_file),
  )?;
  Ok(())
}

fn run_tool(command: &mut Command) -> Result<(), Box<dyn error::Error>> {
  let status = command.status()?;
  if !status.success() {
    return Err(format!("{} exited with {status}", command.get_program().display()).into());
  }
  Ok(())
}
