//! Command shell
//!
//! A small interpreter for the commands a boot script needs. Lines are split
//! on whitespace; the first word selects the command. Blank lines and lines
//! starting with `#` do nothing, which makes a script's `#!script` signature
//! line a no-op.

use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use netboot_image::{exec_image, CommandInterpreter, ExecContext, ImageRegistry, STATUS_OK};
use std::cell::RefCell;
use std::ffi::CStr;
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use tracing::{debug, warn};

/// Command interpreter bound to an image registry
pub struct Shell<W: Write = Stdout> {
    registry: Arc<dyn ImageRegistry>,
    config: ShellConfig,
    output: RefCell<W>,
}

impl Shell<Stdout> {
    /// Create a shell writing to standard output
    pub fn new(registry: Arc<dyn ImageRegistry>, config: ShellConfig) -> Self {
        Self::with_output(registry, config, io::stdout())
    }
}

impl<W: Write> Shell<W> {
    /// Create a shell writing command output to `output`
    pub fn with_output(registry: Arc<dyn ImageRegistry>, config: ShellConfig, output: W) -> Self {
        Self {
            registry,
            config,
            output: RefCell::new(output),
        }
    }

    /// Registry the shell looks images up in
    pub fn registry(&self) -> &Arc<dyn ImageRegistry> {
        &self.registry
    }

    /// Consume the shell, returning its output sink
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    /// Run a single command line and return its status
    pub fn run_line(&self, line: &str) -> i32 {
        match self.dispatch(line) {
            Ok(status) => status,
            Err(e) => {
                warn!(command = %line, error = %e, "Command failed");
                // Output errors cannot be reported anywhere else
                let _ = writeln!(self.output.borrow_mut(), "{}", e);
                e.status()
            }
        }
    }

    fn dispatch(&self, line: &str) -> Result<i32> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = args.split_first() else {
            return Ok(STATUS_OK);
        };
        if command.starts_with('#') {
            return Ok(STATUS_OK);
        }

        if self.config.trace_commands {
            writeln!(self.output.borrow_mut(), "$ {}", line)?;
        }
        debug!(command, args = args.len(), "Dispatching command");

        match command {
            "echo" => self.echo(args),
            "true" => Ok(STATUS_OK),
            "false" => Ok(1),
            "exit" => exit_status(args),
            "imgstat" => self.imgstat(),
            "imgfree" => self.imgfree(args),
            "boot" | "imgexec" => self.boot(args),
            _ => Err(ShellError::UnknownCommand(command.to_string())),
        }
    }

    fn echo(&self, args: &[&str]) -> Result<i32> {
        writeln!(self.output.borrow_mut(), "{}", args.join(" "))?;
        Ok(STATUS_OK)
    }

    fn imgstat(&self) -> Result<i32> {
        let mut output = self.output.borrow_mut();
        for image in self.registry.images() {
            let image_type = image.image_type().map(|t| t.name()).unwrap_or("unknown");
            writeln!(output, "{}: {} bytes [{}]", image.name(), image.len(), image_type)?;
        }
        Ok(STATUS_OK)
    }

    fn imgfree(&self, args: &[&str]) -> Result<i32> {
        let name = single_arg("imgfree", args)?;
        let image = self
            .registry
            .find(name)
            .ok_or_else(|| ShellError::ImageNotFound(name.to_string()))?;
        self.registry.unregister(&image)?;
        Ok(STATUS_OK)
    }

    fn boot(&self, args: &[&str]) -> Result<i32> {
        let image = match args {
            [] => self
                .registry
                .first_executable()
                .ok_or(ShellError::NoExecutableImage)?,
            [name] => self
                .registry
                .find(name)
                .ok_or_else(|| ShellError::ImageNotFound(name.to_string()))?,
            _ => {
                return Err(ShellError::InvalidArgument {
                    command: "boot",
                    reason: "expected at most one image name".to_string(),
                })
            }
        };

        let ctx = ExecContext::new(self.registry.as_ref(), self);
        Ok(exec_image(&image, &ctx)?)
    }
}

impl<W: Write> CommandInterpreter for Shell<W> {
    fn execute(&self, command: &CStr) -> i32 {
        self.run_line(&command.to_string_lossy())
    }
}

fn single_arg<'a>(command: &'static str, args: &[&'a str]) -> Result<&'a str> {
    match args {
        [arg] => Ok(*arg),
        _ => Err(ShellError::InvalidArgument {
            command,
            reason: "expected exactly one argument".to_string(),
        }),
    }
}

fn exit_status(args: &[&str]) -> Result<i32> {
    match args {
        [] => Ok(STATUS_OK),
        [status] => status.parse().map_err(|_| ShellError::InvalidArgument {
            command: "exit",
            reason: format!("invalid status '{}'", status),
        }),
        _ => Err(ShellError::InvalidArgument {
            command: "exit",
            reason: "expected at most one status".to_string(),
        }),
    }
}
