use anyhow::Result;
use dbus_wire::{Connection, Message, MessageKind};

#[tokio::main]
async fn main() -> Result<()> {
    let mut c = Connection::session_bus().await?;

    let serial = c.next_serial();

    let m = Message::method_call("/org/freedesktop/DBus", "Hello", serial)
        .with_interface("org.freedesktop.DBus")
        .with_destination("org.freedesktop.DBus");

    c.send(&m)?;

    loop {
        let reply = c.recv().await?;

        match reply.kind() {
            MessageKind::MethodReturn { reply_serial } if *reply_serial == serial => {
                println!("unique name: {:?}", reply.body());
                return Ok(());
            }
            MessageKind::Error { error_name, .. } => {
                anyhow::bail!("hello failed: {error_name}");
            }
            _ => continue,
        }
    }
}
