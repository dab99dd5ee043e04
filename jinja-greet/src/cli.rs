use std::path::PathBuf;

use clap::{arg, command, value_parser, ArgAction, Command};

const BEHAVIOR: &str = "Template Behavior";
const LOOKUP: &str = "Template Lookup";

pub(super) fn make_command() -> Command {
    command!()
        .max_term_width(120)
        .args([
            #[cfg(feature = "toml")]
            arg!(--"config-file" <PATH> "Path to a config file")
                .long_help("\
                    Loads settings from a TOML config file before the command line flags are \
                    applied.  No config file is read unless this is given.\n\n\
                    \
                    To see the possible config values use --print-config which will print the \
                    current state of the config.")
                .value_parser(value_parser!(PathBuf)),
            arg!(--"template-dir" <DIR> "Directory to load templates from")
                .long_help("\
                    Directory to load templates from.\n\n\
                    \
                    By default templates are loaded from the templates folder that ships with \
                    this package.  Template names are always relative to this directory and \
                    may not contain segments starting with a dot.")
                .value_parser(value_parser!(PathBuf))
                .help_heading(LOOKUP),
            arg!(--bundled "Render from the templates compiled into the binary")
                .long_help("\
                    Render from the templates compiled into the binary instead of reading them \
                    from disk.  The bundle is the package's templates folder as it was at build \
                    time.")
                .conflicts_with("template-dir")
                .help_heading(LOOKUP),
            arg!(-a --autoescape <MODE> "Reconfigures autoescape behavior")
                .long_help("\
                    Reconfigures autoescape behavior.  The default is 'auto' which means that \
                    the file extension sets the auto escaping mode: templates ending in .html, .htm \
                    or .xml (in any case) are HTML escaped, everything else is left alone.\n\n\
                    \
                    html means that variables are escaped to HTML5 and XML rules.  json means \
                    that values are formatted as JSON.  none disables escaping entirely.")
                .value_parser(["auto", "html", "json", "none"])
                .help_heading(BEHAVIOR),
            arg!(-D --define <EXPR> "Defines an input variable (key=value / key:=json_value)")
                .long_help("\
                    This defines an input variable for the template.  It supports three forms: \
                    key defines a single bool, key=value defines a string value, key:=json_value \
                    defines a JSON value.  It can be supplied multiple times to set more than \
                    one value.  Without any defines the template sees name=Jeff.\n\n\
                    \
                    Examples:\n\
                    -D name=Peter       defines a basic string\n\
                    -D user_id:=42      defines an integer\n\
                    -D is_active        shortform to define true boolean")
                .action(ArgAction::Append)
                .help_heading(BEHAVIOR),
            arg!(--strict "Disallow undefined variables in templates")
                .long_help("\
                    Disallow undefined variables in templates instead of rendering empty strings.")
                .help_heading(BEHAVIOR),
            arg!(-n --"no-newline" "Do not output a trailing newline")
                .help_heading(BEHAVIOR),
            arg!(-v --verbose... "Increase log output on stderr (can be repeated)"),
            #[cfg(feature = "toml")]
            arg!(--"print-config" "Print out the loaded config"),
            arg!(template: [TEMPLATE] "Name of the template to render [default: example.txt]"),
        ])
        .about("Renders a template from the package template folder to stdout.")
}
