//! Slider server implementation.

use crate::config::SliderConfig;
use crate::slider::IntSlider;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use widgetsync_core::Transport;
use widgetsync_ws::{serve_socket, ChannelKernel, Session};

pub async fn run(addr: SocketAddr, config: SliderConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on ws://{}", addr);

    let config = Arc::new(config);

    loop {
        let (stream, client_addr) = listener.accept().await?;
        let config = config.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, client_addr, &config).await {
                tracing::warn!("Connection error from {}: {}", client_addr, e);
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    config: &SliderConfig,
) -> anyhow::Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    tracing::debug!("New connection from {}", addr);

    let (kernel, mut outbound) = ChannelKernel::new();
    let mut session = Session::new(Arc::new(kernel));

    let mut slider = Transport::with_target(IntSlider::new(config), session.widget_target());
    slider.on_message(move |content| {
        tracing::info!("custom message from {}: {}", addr, content);
        Ok(())
    });
    slider.open()?;
    slider.display()?;
    let id = session.insert(slider)?;
    tracing::info!("Slider {} ready for {}", id, addr);

    serve_socket(ws, &mut session, &mut outbound).await?;

    if let Some(slider) = session.transport_mut::<IntSlider>(&id) {
        tracing::info!("{} left at value {}", addr, slider.model().value.get());
    }

    tracing::debug!("Connection closed: {}", addr);
    Ok(())
}
