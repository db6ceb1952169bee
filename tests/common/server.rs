//! The server end of a test connection.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::time::timeout;

/// How long to wait for the client to write something.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A scripted IRC server.
pub struct TestServer {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
    syncs: u32,
}

impl TestServer {
    pub fn new(stream: DuplexStream) -> Self {
        let (read, write) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read),
            writer: write,
            syncs: 0,
        }
    }

    /// Send a raw frame, adding CRLF if missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one frame from the client, without its terminator.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(RECV_TIMEOUT).await
    }

    /// Receive a frame with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("client closed the connection");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    /// Receive one frame and check it.
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let got = self.recv().await?;
        anyhow::ensure!(got == expected, "expected {expected:?}, got {got:?}");
        Ok(())
    }

    /// Receive frames until `predicate` matches, returning all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Wait until the client has handled everything sent so far.
    ///
    /// Lines are dispatched in order, so the PONG to our PING only comes
    /// back once every earlier line has been through its handlers. Returns
    /// the frames the client wrote in the meantime.
    pub async fn sync(&mut self) -> anyhow::Result<Vec<String>> {
        self.syncs += 1;
        let token = format!("sync-{}", self.syncs);
        self.send_raw(&format!("PING :{token}")).await?;
        let pong = format!("PONG :{token}");
        let mut lines = self.recv_until(|line| line == pong).await?;
        lines.pop();
        Ok(lines)
    }

    /// Wait for the client to close its end.
    pub async fn expect_closed(&mut self) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
            if n == 0 {
                return Ok(lines);
            }
            lines.push(line.trim_end_matches(['\r', '\n']).to_owned());
        }
    }

    /// Close the server end.
    pub async fn hang_up(mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
