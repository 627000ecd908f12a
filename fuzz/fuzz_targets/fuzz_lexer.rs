#![no_main]

use libfuzzer_sys::fuzz_target;
use zawk::{Context, Lexer, TokenKind};

fuzz_target!(|data: &str| {
    // Errors are expected; panics and hangs are not.
    let mut ctx = Context::new(Lexer::new(data));
    loop {
        match ctx.scan() {
            Ok(token) if token.kind == TokenKind::Eof => break,
            Ok(_) => {
                // Bad regex literals are reported, not fatal here
                let _ = ctx.literal_from_token();
            }
            Err(_) => break,
        }
    }
});
