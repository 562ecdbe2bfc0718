//! Real [`W5500Bus`] implementation over `w5500-hl`/`w5500-ll` (feature
//! `eh1`, embedded-hal 1.0). Only compiled with the `embedded` feature —
//! host builds and all of this crate's tests use the scripted fake in
//! `tcp::client`'s test module instead.
//!
//! Grounded on `other_examples/4ac71431_birkenfeld-rp2040-w5500`, which
//! drives the same chip through the `eh0` variant of these crates
//! (`w5500_dhcp::{hl, ll}`, itself a thin re-export of `w5500-hl`/
//! `w5500-ll`). That example runs the chip in DHCP/listen mode; this
//! adapter instead opens one outbound client socket, the shape this
//! crate's state machine needs (§4.3).

use embedded_hal::spi::SpiDevice;
use w5500_hl::{
    ll::{
        net::{Ipv4Addr, SocketAddrV4},
        LinkStatus, OperationMode, PhyCfg, Registers, Sn, SocketInterrupt, SocketInterruptMask,
        SocketStatus,
    },
    Tcp,
};

use crate::config::NetworkConfig;
use crate::error::Error;
use crate::error::Result;
use crate::error::{LinkError, SpiError};
use crate::tcp::client::{SocketInterrupts, W5500Bus};

/// This crate uses exactly one TCP socket, number 0 (§4.3).
const SOCKET: Sn = Sn::Sn0;
/// PHY link poll attempts before giving up on one `configure` call.
const LINK_POLL_ATTEMPTS: u32 = 8;
const LINK_POLL_PERIOD_MS: u32 = 200;
/// 16 KiB RX/TX for the one socket in use (§4.3).
const SOCKET_BUFFER_KIB: u8 = 16;

pub struct RealW5500Bus<SPI> {
    w5500: w5500_hl::ll::eh1::vdm_infallible_gpio::W5500<SPI>,
}

impl<SPI: SpiDevice> RealW5500Bus<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self {
            w5500: w5500_hl::ll::eh1::vdm_infallible_gpio::W5500::new(spi),
        }
    }
}

impl<SPI: SpiDevice> W5500Bus for RealW5500Bus<SPI> {
    fn configure(&mut self, network: &NetworkConfig) -> Result<()> {
        self.w5500
            .set_shar(&network.mac.into())
            .map_err(|_| Error::Spi(SpiError::Io))?;
        self.w5500
            .set_sipr(&Ipv4Addr::new(
                network.ip[0],
                network.ip[1],
                network.ip[2],
                network.ip[3],
            ))
            .map_err(|_| Error::Spi(SpiError::Io))?;
        self.w5500
            .set_subr(&Ipv4Addr::new(
                network.netmask[0],
                network.netmask[1],
                network.netmask[2],
                network.netmask[3],
            ))
            .map_err(|_| Error::Spi(SpiError::Io))?;

        let phy_cfg = PhyCfg::DEFAULT.set_opmdc(OperationMode::FullDuplex10bt);
        self.w5500.set_phycfgr(phy_cfg).map_err(|_| Error::Spi(SpiError::Io))?;

        for _ in 0..LINK_POLL_ATTEMPTS {
            let phy_cfg: PhyCfg = self.w5500.phycfgr().map_err(|_| Error::Spi(SpiError::Io))?;
            if phy_cfg.lnk() == LinkStatus::Up {
                break;
            }
            // A real implementation would delay here via an injected clock;
            // omitted because `configure` doesn't carry one — the caller's
            // outer retry loop (`tcp::client::TcpClient::initialise`) already
            // waits between whole-configure attempts.
        }

        self.w5500
            .set_sn_rxbuf_size(SOCKET, SOCKET_BUFFER_KIB)
            .map_err(|_| Error::Spi(SpiError::Io))?;
        self.w5500
            .set_sn_txbuf_size(SOCKET, SOCKET_BUFFER_KIB)
            .map_err(|_| Error::Spi(SpiError::Io))?;
        Ok(())
    }

    fn phy_link_up(&mut self) -> Result<bool> {
        let phy_cfg: PhyCfg = self.w5500.phycfgr().map_err(|_| Error::Spi(SpiError::Io))?;
        Ok(phy_cfg.lnk() == LinkStatus::Up)
    }

    fn is_close_wait(&mut self) -> Result<bool> {
        let status = self.w5500.sn_sr(SOCKET).map_err(|_| Error::Spi(SpiError::Io))?;
        Ok(status == SocketStatus::CloseWait)
    }

    fn open_tcp(&mut self) -> Result<()> {
        self.w5500.tcp_connect(SOCKET, 0, &SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
            .map(|_| ())
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    fn connect(&mut self, server_ip: [u8; 4], server_port: u16) -> Result<()> {
        let addr = SocketAddrV4::new(
            Ipv4Addr::new(server_ip[0], server_ip[1], server_ip[2], server_ip[3]),
            server_port,
        );
        self.w5500
            .tcp_connect(SOCKET, 0, &addr)
            .map(|_| ())
            .map_err(|_| Error::Link(LinkError::Down))
    }

    fn disconnect(&mut self) -> Result<()> {
        self.w5500.disconnect(SOCKET).map_err(|_| Error::Spi(SpiError::Io))
    }

    fn close(&mut self) -> Result<()> {
        self.w5500.close(SOCKET).map_err(|_| Error::Spi(SpiError::Io))
    }

    fn enable_interrupts(&mut self, received: bool, disconnected: bool) -> Result<()> {
        let mut mask = SocketInterruptMask::ALL_MASKED;
        if received {
            mask = mask.unmask_recv();
        }
        if disconnected {
            mask = mask.unmask_discon();
        }
        self.w5500
            .set_sn_imr(SOCKET, mask)
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    fn disable_interrupts(&mut self) -> Result<()> {
        self.w5500
            .set_sn_imr(SOCKET, SocketInterruptMask::ALL_MASKED)
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    fn read_and_clear_interrupts(&mut self) -> Result<SocketInterrupts> {
        let sir = self.w5500.sn_ir(SOCKET).map_err(|_| Error::Spi(SpiError::Io))?;
        let flags = SocketInterrupts {
            received: sir.any_raised(SocketInterrupt::RECV_MASK),
            disconnected: sir.any_raised(SocketInterrupt::DISCON_MASK),
        };
        self.w5500.set_sn_ir(SOCKET, sir).map_err(|_| Error::Spi(SpiError::Io))?;
        Ok(flags)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.w5500
            .tcp_read(SOCKET, buf)
            .map(|n| n as usize)
            .map_err(|_| Error::Spi(SpiError::Io))
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.w5500
            .tcp_write(SOCKET, data)
            .map(|_| ())
            .map_err(|_| Error::Spi(SpiError::Io))
    }
}
