//! CLI driver: a JSON optimization request on stdin, the ranked response on
//! stdout. Errors go to stderr in the same `{error, kind}` shape the HTTP
//! surface uses, with a non-zero exit code.

use std::io::Read;

use lineup::{api, optimizer};

fn main() {
    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read stdin: {}", err);
        std::process::exit(2);
    }

    let body: serde_json::Value = match serde_json::from_str(&input) {
        Ok(value) => value,
        Err(err) => {
            fail("MalformedRequest", &format!("invalid JSON: {}", err));
        }
    };

    let outcome = api::parse_optimize_request(body).and_then(|request| {
        let ranked = optimizer::optimize(&request)?;
        Ok(api::to_wire_response(&ranked, &request.hitters))
    });

    match outcome {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(text) => println!("{}", text),
            Err(err) => {
                eprintln!("failed to serialize response: {}", err);
                std::process::exit(2);
            }
        },
        Err(err) => fail(err.kind(), &err.to_string()),
    }
}

fn fail(kind: &str, message: &str) -> ! {
    eprintln!(
        "{}",
        serde_json::json!({ "error": message, "kind": kind })
    );
    std::process::exit(1);
}
