use std::io;

use tokio::signal;
use tokio_util::sync::CancellationToken;

#[cfg(target_family = "windows")]
pub async fn terminate() -> io::Result<()> {
    signal::ctrl_c().await
}

/// ctrl + c 发送的是 SIGINT 信号，docker stop 发送的是 SIGTERM 信号，都需要处理
#[cfg(target_family = "unix")]
pub async fn terminate() -> io::Result<()> {
    use tokio::select;

    let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    let mut int = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    select! {
        _ = term.recv() => Ok(()),
        _ = int.recv() => Ok(()),
    }
}

/// 收到退出信号后取消 token，正在进行的同步与服务都会随之停止
pub fn cancel_on_terminate(token: CancellationToken) {
    tokio::spawn(cancel_on(terminate(), token));
}

/// 信号监听失败时不取消 token，程序照常运行
async fn cancel_on(signal: impl Future<Output = io::Result<()>>, token: CancellationToken) {
    if let Err(e) = signal.await {
        error!("监听退出信号失败：{:#}", e);
        return;
    }
    info!("收到退出信号，正在停止..");
    token.cancel();
}

#[cfg(test)]
mod tests {
    use std::future;

    use super::*;

    #[tokio::test]
    async fn test_cancel_only_on_signal() {
        let token = CancellationToken::new();
        cancel_on(future::ready(Err(io::Error::other("no signal handler"))), token.clone()).await;
        assert!(!token.is_cancelled());
        cancel_on(future::ready(Ok(())), token.clone()).await;
        assert!(token.is_cancelled());
    }
}
