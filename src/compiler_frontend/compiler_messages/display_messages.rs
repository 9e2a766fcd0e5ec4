use crate::compiler_frontend::compiler_errors::{
    CompilerError, CompilerMessages, ErrorMetaDataKey, ErrorType,
};
use saying::say;

pub fn print_compiler_messages(messages: CompilerMessages) {
    for err in messages.errors {
        print_formatted_error(err);
    }
}

pub fn print_formatted_error(e: CompilerError) {
    let line_number = e.location.start_pos.line_number as usize;

    match e.error_type {
        ErrorType::Syntax => {
            say!("\n(╯°□°)╯  🔥🔥  Σ(°△°;) ");
            say!(Red "Syntax");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Type => {
            say!("\n(ಠ_ಠ) ");
            say!(Red "Type Error");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Rule => {
            say!("\nヽ(˶°o°)ﾉ  🔥🔥🔥  ╰(°□°╰) ");
            say!(Red "Rule");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Unimplemented => {
            say!("\n(-_-) ");
            say!(Yellow "Not supported yet");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Compiler => {
            say!("\nヽ༼☉ ‿ ⚆༽ﾉ  🔥🔥🔥🔥  ╰(° _ o╰) ");
            say!(Yellow "COMPILER BUG - ");
            say!(Dark Yellow "shader lowering developer skill issue (not your fault)");
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::Config => {
            say!(Yellow "CONFIG FILE ISSUE- ");
            say!(e.msg);
            return;
        }

        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file or directory");
            say!(e.msg);
            return;
        }
    }

    say!(Red e.msg);

    if let Some(suggestion) = e.metadata.get(&ErrorMetaDataKey::PrimarySuggestion) {
        say!(Green "Suggestion: ", suggestion);
    }

    if let (Some(expected), Some(found)) = (
        e.metadata.get(&ErrorMetaDataKey::ExpectedType),
        e.metadata.get(&ErrorMetaDataKey::FoundType),
    ) {
        say!(Dark Magenta "Expected ", Bright expected, Dark Magenta " but found ", Bright found);
    }
}
