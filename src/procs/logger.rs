// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::procs::ServiceProcess;

/// Reads the captured stdout and stderr of the process and forwards each line to the log
///
/// Rules:
///  - the pipes are taken from the process, nothing else will read them afterwards
///  - each pipe is read on its own task until EOF, so the child never blocks on a full pipe
///  - output that is not UTF-8 is forwarded lossily, it never stops the reader
pub fn drain_output(process: &mut ServiceProcess) {
    let name = process.descriptor().to_string();

    if let Some(stdout) = process.take_stdout() {
        tokio::spawn(forward_lines(name.clone(), "stdout", stdout));
    }

    if let Some(stderr) = process.take_stderr() {
        tokio::spawn(forward_lines(name, "stderr", stderr));
    }
}

/// Returns the number of lines forwarded before EOF or a read error
async fn forward_lines<R>(service: String, stream: &'static str, reader: R) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut forwarded = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
                tracing::info!(%service, stream, "{}", line);
                forwarded += 1;
            }
            Err(e) => {
                tracing::warn!(%service, stream, "failed to read output: {}", e);
                break;
            }
        }
    }

    tracing::debug!(%service, stream, "output closed");
    forwarded
}
